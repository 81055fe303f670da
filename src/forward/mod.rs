//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Forward-classified request (any method)
//!     → gateway.rs (rebuild URL on the analytics host, relay)
//!     → upstream response relayed verbatim
//!     → transport failure → 502 / 504
//! ```

pub mod gateway;

pub use gateway::{ForwardError, ForwardingGateway};
