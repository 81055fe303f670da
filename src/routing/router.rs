//! Per-request classification.
//!
//! # Responsibilities
//! - Decide whether a request is forwarded, passed through, or a trackable GET
//! - Carry the forward remainder to the forwarding gateway
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Forward check runs first and wins regardless of method
//! - Explicit outcome enum rather than boolean flags

use axum::http::{Method, Request};

use crate::routing::matcher::ForwardPathMatcher;

/// Outcome of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Relay to the analytics host at `remainder`.
    Forward { remainder: String },
    /// Non-GET request for the origin; never buffered nor tracked.
    Passthrough,
    /// GET request eligible for injection and server-side tracking.
    TrackableGet,
}

impl Route {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Forward { .. } => "forward",
            Route::Passthrough => "passthrough",
            Route::TrackableGet => "tracked_get",
        }
    }
}

/// Classifies requests against the configured forward path.
#[derive(Debug, Clone)]
pub struct Classifier {
    forward: ForwardPathMatcher,
}

impl Classifier {
    pub fn new(forward_path: &str) -> Self {
        Self {
            forward: ForwardPathMatcher::new(forward_path),
        }
    }

    pub fn classify<B>(&self, req: &Request<B>) -> Route {
        if let Some(remainder) = self.forward.strip(req.uri().path()) {
            return Route::Forward {
                remainder: remainder.to_string(),
            };
        }

        if req.method() == Method::GET {
            Route::TrackableGet
        } else {
            Route::Passthrough
        }
    }

    pub fn forward_prefix(&self) -> &str {
        self.forward.prefix()
    }
}
