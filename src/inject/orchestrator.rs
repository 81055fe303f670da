//! Buffer-inspect-splice-flush driver for GET responses.
//!
//! # States
//! ```text
//! NotStarted → Buffering → Inspected → Spliced | Unmodified → Flushed
//! ```
//!
//! # Design Decisions
//! - Status and headers are inspected before the body is read, so
//!   ineligible responses stream through without buffering
//! - Only 2xx `text/html` bodies without a content coding are buffered
//! - Any failure falls back to the origin response; a page is never lost
//!   to an injection problem

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    http::{
        header::{CONTENT_ENCODING, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::Response,
};

use crate::http::response::{CaptureError, ResponseCapture};
use crate::inject::splice::{splice, HEAD_CLOSE};

/// What happened to one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionOutcome {
    /// Snippet spliced into the body that was sent.
    Injected,
    /// Body buffered but left as the origin wrote it.
    Unmodified,
    /// Response not eligible; streamed through unbuffered.
    Skipped,
}

impl InjectionOutcome {
    pub fn injected(self) -> bool {
        self == InjectionOutcome::Injected
    }

    pub fn label(self) -> &'static str {
        match self {
            InjectionOutcome::Injected => "injected",
            InjectionOutcome::Unmodified => "unmodified",
            InjectionOutcome::Skipped => "skipped",
        }
    }
}

/// Splices the rendered snippet into origin HTML responses.
#[derive(Debug, Clone)]
pub struct Injector {
    snippet: Arc<str>,
    max_buffer_bytes: usize,
}

impl Injector {
    pub fn new(snippet: impl Into<Arc<str>>, max_buffer_bytes: usize) -> Self {
        Self {
            snippet: snippet.into(),
            max_buffer_bytes,
        }
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// Run one origin response through the injector.
    pub async fn process(&self, response: Response) -> (Response, InjectionOutcome) {
        if !is_eligible(response.status(), response.headers()) {
            return (response, InjectionOutcome::Skipped);
        }

        let mut capture = match ResponseCapture::capture(response, self.max_buffer_bytes).await {
            Ok(capture) => capture,
            Err(CaptureError::Overflow(response)) => {
                tracing::debug!(
                    limit = self.max_buffer_bytes,
                    "HTML body over buffer limit, passing through"
                );
                return (response, InjectionOutcome::Skipped);
            }
            Err(CaptureError::Body { reason, response }) => {
                tracing::warn!(error = %reason, "Origin body failed while buffering, passing through");
                return (response, InjectionOutcome::Skipped);
            }
        };

        let outcome = match splice(capture.body(), &HEAD_CLOSE, &self.snippet) {
            Cow::Owned(spliced) if spliced.as_slice() != capture.body() => {
                capture.replace_body(spliced);
                InjectionOutcome::Injected
            }
            _ => InjectionOutcome::Unmodified,
        };

        (capture.flush(), outcome)
    }
}

/// 2xx, `text/html`, and no content coding.
fn is_eligible(status: StatusCode, headers: &HeaderMap) -> bool {
    if !status.is_success() {
        return false;
    }

    let is_html = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false);

    let is_identity = headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case("identity"))
        .unwrap_or(true);

    is_html && is_identity
}
