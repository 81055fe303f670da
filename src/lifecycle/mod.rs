//! Process lifecycle for the edge binary.
//!
//! # Data Flow
//! ```text
//! startup.rs:  EdgeConfig → metrics exporter → UmamiPlugin → HttpServer → bind
//! signals.rs:  SIGINT / SIGTERM → shutdown_signal() resolves
//! shutdown.rs: Shutdown::trigger → every ShutdownSignal::recv wakes
//!              → server stops accepting → bounded drain → exit
//! ```
//!
//! # Design Decisions
//! - The listener binds only after the middleware is resolved
//! - The drain window reuses the request timeout

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
