//! Startup error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop the edge binary from starting.
#[derive(Debug, Error)]
pub enum EdgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid origin address {0:?}, expected host:port")]
    OriginAddress(String),

    #[error("invalid listener address {0:?}")]
    ListenerAddress(String),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
