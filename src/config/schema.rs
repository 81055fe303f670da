//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default forwarding sub-path segment.
pub const DEFAULT_FORWARD_PATH: &str = "_umami";

/// Injection mode value rendering a `<script src=...>` tag.
pub const SCRIPT_INJECTION_MODE_TAG: &str = "tag";
/// Injection mode value inlining the tracker source.
pub const SCRIPT_INJECTION_MODE_SOURCE: &str = "source";
/// Tracking mode value firing on every qualifying GET.
pub const TRACKING_MODE_ALL: &str = "all";
/// Tracking mode value firing only when the script was not injected.
pub const TRACKING_MODE_NOT_INJECTED: &str = "notinjected";

/// Root configuration for the edge binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Origin application sitting behind the edge.
    pub origin: OriginConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Analytics middleware settings.
    pub umami: UmamiConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Origin server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Origin address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Deadline for a relayed call to the analytics host in seconds.
    pub forward_secs: u64,

    /// Deadline for a detached tracking event in seconds.
    pub tracking_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            forward_secs: 10,
            tracking_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Analytics middleware configuration, as written by the operator.
///
/// Mode fields stay strings here so that an unknown value degrades the
/// middleware to passthrough instead of failing deserialization.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UmamiConfig {
    /// Path segment relayed to the analytics host.
    pub forward_path: String,

    /// Base URL of the analytics host.
    pub umami_host: String,

    /// Website id registered with the analytics host.
    pub website_id: String,

    pub auto_track: bool,
    pub do_not_track: bool,

    /// Rendered as a script hint only; nothing is cached here.
    pub cache: bool,

    /// Allowed hostnames; empty means no restriction.
    pub domains: Vec<String>,

    pub evade_google_tag_manager: bool,

    /// Master switch for HTML rewriting.
    pub script_injection: bool,

    /// "tag" or "source".
    pub script_injection_mode: String,

    /// Master switch for synthetic pageview events.
    pub server_side_tracking: bool,

    /// "all" or "notinjected".
    pub server_side_tracking_mode: String,

    /// Upper bound on a buffered origin body.
    pub max_buffer_bytes: usize,
}

impl Default for UmamiConfig {
    fn default() -> Self {
        Self {
            forward_path: DEFAULT_FORWARD_PATH.to_string(),
            umami_host: String::new(),
            website_id: String::new(),
            auto_track: true,
            do_not_track: false,
            cache: false,
            domains: Vec::new(),
            evade_google_tag_manager: false,
            script_injection: true,
            script_injection_mode: SCRIPT_INJECTION_MODE_TAG.to_string(),
            server_side_tracking: false,
            server_side_tracking_mode: TRACKING_MODE_ALL.to_string(),
            max_buffer_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}
