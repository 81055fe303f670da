//! Request matching logic.
//!
//! # Responsibilities
//! - Match the forward path on whole path segments
//! - Match the request host against the allowed domain list
//!
//! # Design Decisions
//! - Host matching is case-insensitive, port ignored
//! - Path matching is case-sensitive
//! - Empty domain list = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use axum::http::{header, Request};

/// Matches requests addressed to the forward path.
///
/// `/_umami` and `/_umami/...` match; `/_umamix` and `/_umami-page` do not.
#[derive(Debug, Clone)]
pub struct ForwardPathMatcher {
    /// "/" followed by the configured segment(s).
    prefix: String,
}

impl ForwardPathMatcher {
    /// Create a matcher for a segment given without surrounding slashes.
    pub fn new(segment: &str) -> Self {
        Self {
            prefix: format!("/{}", segment.trim_matches('/')),
        }
    }

    /// Returns the remainder after the forward segment when the path matches.
    ///
    /// The remainder always starts with `/`.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    /// The public path prefix, e.g. `/_umami`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Matches the request host against an allow-list.
#[derive(Debug, Clone, Default)]
pub struct DomainMatcher {
    allowed: Vec<String>,
}

impl DomainMatcher {
    /// Create a matcher. Hosts are normalized to lowercase.
    pub fn new(domains: &[String]) -> Self {
        Self {
            allowed: domains.iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    pub fn matches<B>(&self, req: &Request<B>) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        request_host(req)
            .map(|host| self.allowed.iter().any(|d| *d == host))
            .unwrap_or(false)
    }
}

/// Lowercased request host without port, from `Host` or the URI authority.
pub fn request_host<B>(req: &Request<B>) -> Option<String> {
    let raw = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().host())?;
    let host = strip_port(raw.trim());
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

fn strip_port(authority: &str) -> &str {
    if let Some(rest) = authority.strip_prefix('[') {
        // IPv6 literal: keep the address inside the brackets
        return rest.split(']').next().unwrap_or(rest);
    }
    authority.split(':').next().unwrap_or(authority)
}
