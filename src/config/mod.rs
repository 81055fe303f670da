//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → EdgeConfig (listener, origin, timeouts, observability, umami)
//!     → validation.rs (semantic checks on [umami])
//!     → Settings (resolved, immutable)
//!     → shared via Arc to every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Semantic failures never abort startup; the middleware degrades to passthrough

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    EdgeConfig, ListenerConfig, ObservabilityConfig, OriginConfig, TimeoutConfig, UmamiConfig,
};
pub use validation::{ScriptInjectionMode, Settings, TrackingMode, ValidationError};
