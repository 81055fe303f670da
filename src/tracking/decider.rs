//! Whether a GET request gets a synthetic pageview.
//!
//! # Design Decisions
//! - Request-side gates (domains, DNT) run before the origin sees the request
//! - The mode gate runs after injection, on the injected flag
//! - Pure: no I/O, no shared mutable state

use axum::http::Request;

use crate::config::{Settings, TrackingMode};
use crate::routing::matcher::DomainMatcher;

#[derive(Debug, Clone)]
pub struct TrackingPolicy {
    enabled: bool,
    mode: TrackingMode,
    domains: DomainMatcher,
    respect_dnt: bool,
}

impl TrackingPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            enabled: settings.server_side_tracking,
            mode: settings.server_side_tracking_mode,
            domains: DomainMatcher::new(&settings.domains),
            respect_dnt: settings.do_not_track,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Request-side gate, evaluated before the origin consumes the request.
    pub fn admits<B>(&self, req: &Request<B>) -> bool {
        if !self.enabled || !self.domains.matches(req) {
            return false;
        }
        !(self.respect_dnt && sends_dnt(req))
    }

    /// Mode gate, evaluated once the injection outcome is known.
    pub fn should_track(&self, injected: bool) -> bool {
        if !self.enabled {
            return false;
        }
        match self.mode {
            TrackingMode::All => true,
            TrackingMode::NotInjected => !injected,
        }
    }
}

fn sends_dnt<B>(req: &Request<B>) -> bool {
    req.headers()
        .get("dnt")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UmamiConfig;
    use axum::body::Body;

    fn policy(edit: impl FnOnce(&mut UmamiConfig)) -> TrackingPolicy {
        let mut config = UmamiConfig {
            umami_host: "https://stats.example.com".into(),
            website_id: "site-1".into(),
            server_side_tracking: true,
            ..Default::default()
        };
        edit(&mut config);
        TrackingPolicy::from_settings(&Settings::resolve(&config))
    }

    fn get(host: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header("Host", host)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_mode_all_ignores_injection() {
        let p = policy(|_| {});
        assert!(p.should_track(true));
        assert!(p.should_track(false));
    }

    #[test]
    fn test_mode_not_injected() {
        let p = policy(|c| c.server_side_tracking_mode = "notinjected".into());
        assert!(!p.should_track(true));
        assert!(p.should_track(false));
    }

    #[test]
    fn test_disabled_never_tracks() {
        let p = policy(|c| c.server_side_tracking = false);
        assert!(!p.admits(&get("example.com")));
        assert!(!p.should_track(false));
    }

    #[test]
    fn test_invalid_mode_disables() {
        let p = policy(|c| c.server_side_tracking_mode = "bogus".into());
        assert!(!p.enabled());
        assert!(!p.should_track(false));
    }

    #[test]
    fn test_domain_gate() {
        let p = policy(|c| c.domains = vec!["example.com".into()]);
        assert!(p.admits(&get("example.com")));
        assert!(!p.admits(&get("staging.example.com")));
    }

    #[test]
    fn test_do_not_track_gate() {
        let mut req = get("example.com");
        req.headers_mut().insert("dnt", "1".parse().unwrap());

        assert!(policy(|_| {}).admits(&req));
        assert!(!policy(|c| c.do_not_track = true).admits(&req));
    }
}
