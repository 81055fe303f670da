//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, host)
//!     → router.rs (classify)
//!     → matcher.rs (forward segment, domain allow-list)
//!     → Return: Forward { remainder } | Passthrough | TrackableGet
//! ```
//!
//! # Design Decisions
//! - Classifier built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same route

pub mod matcher;
pub mod router;

pub use matcher::{DomainMatcher, ForwardPathMatcher};
pub use router::{Classifier, Route};
