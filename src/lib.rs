//! Analytics edge middleware for Umami.
//!
//! Sits in front of an origin web application and, per request:
//! relays a fixed sub-path to the analytics host, injects the tracker
//! into HTML pages, and optionally emits pageviews server-side.
//!
//! ```no_run
//! # async fn demo() -> Result<(), reqwest::Error> {
//! use axum::{routing::get, Router};
//! use umami_edge::config::{TimeoutConfig, UmamiConfig};
//! use umami_edge::UmamiPlugin;
//!
//! let config = UmamiConfig {
//!     umami_host: "https://stats.example.com".into(),
//!     website_id: "00000000-0000-0000-0000-000000000000".into(),
//!     ..Default::default()
//! };
//! let plugin = UmamiPlugin::new(&config, &TimeoutConfig::default()).await?;
//! let app: Router = plugin.wrap(Router::new().route("/", get(|| async { "hi" })));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

// Core subsystems
pub mod config;
pub mod forward;
pub mod http;
pub mod inject;
pub mod plugin;
pub mod routing;
pub mod tracking;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::{EdgeConfig, UmamiConfig};
pub use error::EdgeError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use plugin::UmamiPlugin;
