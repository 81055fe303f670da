//! Logs and counters.
//!
//! # Data Flow
//! ```text
//! plugin / forward / tracking
//!     → logging.rs (tracing subscriber: pretty or JSON lines on stdout)
//!     → metrics.rs (route, injection, tracking and forward counters)
//!         → Prometheus scrape endpoint, when enabled
//! ```
//!
//! # Design Decisions
//! - Configuration problems are logged once, at construction
//! - Per-request log lines stay at debug; the request ID rides along as a field

pub mod logging;
pub mod metrics;
