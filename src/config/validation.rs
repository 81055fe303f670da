//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Resolve mode strings into enums
//! - Normalise the forward path and analytics host
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: UmamiConfig → Result<(), Vec<ValidationError>>
//! - An invalid config is not fatal; it resolves to passthrough-only Settings

use thiserror::Error;
use url::Url;

use crate::config::schema::{
    UmamiConfig, SCRIPT_INJECTION_MODE_SOURCE, SCRIPT_INJECTION_MODE_TAG, TRACKING_MODE_ALL,
    TRACKING_MODE_NOT_INJECTED,
};

/// A single semantic problem in the `[umami]` table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("umamiHost is not set")]
    MissingUmamiHost,

    #[error("umamiHost {0:?} is not an absolute http(s) URL")]
    InvalidUmamiHost(String),

    #[error("websiteId is not set")]
    MissingWebsiteId,

    #[error("forwardPath is empty")]
    EmptyForwardPath,

    #[error("scriptInjectionMode {0:?} is not valid (expected \"tag\" or \"source\")")]
    InvalidScriptInjectionMode(String),

    #[error("serverSideTrackingMode {0:?} is not valid (expected \"all\" or \"notinjected\")")]
    InvalidTrackingMode(String),
}

/// How the tracker reaches the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptInjectionMode {
    /// `<script src="/{forwardPath}/script.js">`
    Tag,
    /// Tracker source inlined into the page.
    Source,
}

impl ScriptInjectionMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            SCRIPT_INJECTION_MODE_TAG => Some(Self::Tag),
            SCRIPT_INJECTION_MODE_SOURCE => Some(Self::Source),
            _ => None,
        }
    }
}

/// When a synthetic pageview is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    All,
    NotInjected,
}

impl TrackingMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            TRACKING_MODE_ALL => Some(Self::All),
            TRACKING_MODE_NOT_INJECTED => Some(Self::NotInjected),
            _ => None,
        }
    }
}

/// Resolved, read-only middleware settings shared by every request.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Forward segment without surrounding slashes.
    pub forward_path: String,
    /// Analytics host base URL without trailing slash.
    pub umami_host: String,
    pub website_id: String,
    pub auto_track: bool,
    pub do_not_track: bool,
    pub cache: bool,
    pub domains: Vec<String>,
    pub evade_google_tag_manager: bool,
    pub script_injection: bool,
    pub script_injection_mode: ScriptInjectionMode,
    pub server_side_tracking: bool,
    pub server_side_tracking_mode: TrackingMode,
    pub max_buffer_bytes: usize,
    errors: Vec<ValidationError>,
}

impl Settings {
    /// Resolve a raw config. Never fails; problems are kept in `errors()`.
    pub fn resolve(config: &UmamiConfig) -> Self {
        let errors = validate_config(config).err().unwrap_or_default();

        let script_injection_mode = ScriptInjectionMode::parse(&config.script_injection_mode);
        let server_side_tracking_mode = TrackingMode::parse(&config.server_side_tracking_mode);

        Self {
            forward_path: normalize_forward_path(&config.forward_path).to_string(),
            umami_host: config.umami_host.trim().trim_end_matches('/').to_string(),
            website_id: config.website_id.trim().to_string(),
            auto_track: config.auto_track,
            do_not_track: config.do_not_track,
            cache: config.cache,
            domains: config
                .domains
                .iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
            evade_google_tag_manager: config.evade_google_tag_manager,
            // An unknown mode switches its feature off
            script_injection: config.script_injection && script_injection_mode.is_some(),
            script_injection_mode: script_injection_mode.unwrap_or(ScriptInjectionMode::Tag),
            server_side_tracking: config.server_side_tracking
                && server_side_tracking_mode.is_some(),
            server_side_tracking_mode: server_side_tracking_mode.unwrap_or(TrackingMode::All),
            max_buffer_bytes: config.max_buffer_bytes,
            errors,
        }
    }

    /// Whether forwarding, injection and tracking may run at all.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

/// Check the config, collecting every problem.
pub fn validate_config(config: &UmamiConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let host = config.umami_host.trim();
    if host.is_empty() {
        errors.push(ValidationError::MissingUmamiHost);
    } else {
        match Url::parse(host) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => errors.push(ValidationError::InvalidUmamiHost(host.to_string())),
        }
    }

    if config.website_id.trim().is_empty() {
        errors.push(ValidationError::MissingWebsiteId);
    }

    if normalize_forward_path(&config.forward_path).is_empty() {
        errors.push(ValidationError::EmptyForwardPath);
    }

    if ScriptInjectionMode::parse(&config.script_injection_mode).is_none() {
        errors.push(ValidationError::InvalidScriptInjectionMode(
            config.script_injection_mode.clone(),
        ));
    }

    if TrackingMode::parse(&config.server_side_tracking_mode).is_none() {
        errors.push(ValidationError::InvalidTrackingMode(
            config.server_side_tracking_mode.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn normalize_forward_path(path: &str) -> &str {
    path.trim().trim_matches('/')
}
