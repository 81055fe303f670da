//! Server-side tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Trackable GET
//!     → decider.rs (enabled? domain allowed? DNT?)        before origin
//!     → event.rs (capture PageView from request)
//!     → [origin + injection run]
//!     → decider.rs (mode vs. injected flag)                after origin
//!     → dispatcher.rs (spawn detached POST /api/send)
//! ```

pub mod decider;
pub mod dispatcher;
pub mod event;

pub use decider::TrackingPolicy;
pub use dispatcher::Dispatcher;
pub use event::{PageView, TrackingEvent};
