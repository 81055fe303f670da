//! The analytics edge: per-request control flow.
//!
//! # Data Flow
//! ```text
//! Request
//!     → invalid settings?      → origin, untouched
//!     → Forward { remainder }  → forward::gateway (any method)
//!     → Passthrough            → origin, untouched
//!     → TrackableGet
//!         → tracking gate (capture PageView)
//!         → origin → inject::Injector (if scriptInjection)
//!         → tracking mode gate → tracking::Dispatcher (detached)
//! ```
//!
//! # Design Decisions
//! - Everything is resolved once in `UmamiPlugin::new`; requests only read
//! - Shared via `Arc`, no locks on the request path
//! - An invalid configuration never fails startup or requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::config::{ScriptInjectionMode, Settings, TimeoutConfig, UmamiConfig};
use crate::forward::ForwardingGateway;
use crate::http::request::request_id;
use crate::inject::{
    render_script,
    script::{fetch_tracker_source, render_tag},
    InjectionOutcome, Injector,
};
use crate::observability::metrics;
use crate::routing::{Classifier, Route};
use crate::tracking::{Dispatcher, PageView, TrackingPolicy};

/// Prefix on configuration log lines.
const LOG_PREFIX: &str = "[umami-edge]";

/// Cheaply cloneable handle to the resolved middleware.
#[derive(Debug, Clone)]
pub struct UmamiPlugin {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    settings: Settings,
    classifier: Classifier,
    injector: Option<Injector>,
    gateway: ForwardingGateway,
    policy: TrackingPolicy,
    dispatcher: Dispatcher,
}

impl UmamiPlugin {
    /// Resolve `config` and prepare everything requests need.
    ///
    /// Problems are logged once here. An invalid config yields a plugin that
    /// passes every request straight to the origin.
    pub async fn new(
        config: &UmamiConfig,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(config, timeouts, client).await)
    }

    /// As [`UmamiPlugin::new`], with a caller-supplied HTTP client.
    pub async fn with_client(
        config: &UmamiConfig,
        timeouts: &TimeoutConfig,
        client: reqwest::Client,
    ) -> Self {
        let settings = Settings::resolve(config);
        for error in settings.errors() {
            tracing::warn!(error = %error, "{} {}", LOG_PREFIX, error);
        }
        if !settings.is_valid() {
            tracing::warn!("{} invalid configuration, passing all requests through", LOG_PREFIX);
        }

        let forward_timeout = Duration::from_secs(timeouts.forward_secs);
        let injector = if settings.is_valid() && settings.script_injection {
            let snippet = build_snippet(&settings, &client, forward_timeout).await;
            tracing::debug!(script = %snippet, "Tracker snippet rendered");
            Some(Injector::new(snippet, settings.max_buffer_bytes))
        } else {
            None
        };

        let inner = Inner {
            classifier: Classifier::new(&settings.forward_path),
            gateway: ForwardingGateway::new(
                client.clone(),
                &settings.umami_host,
                forward_timeout,
                settings.max_buffer_bytes,
            ),
            policy: TrackingPolicy::from_settings(&settings),
            dispatcher: Dispatcher::new(
                client,
                &settings.umami_host,
                &settings.website_id,
                Duration::from_secs(timeouts.tracking_secs),
            ),
            injector,
            settings,
        };

        tracing::info!(
            valid = inner.settings.is_valid(),
            forward_path = %inner.classifier.forward_prefix(),
            script_injection = inner.injector.is_some(),
            server_side_tracking = inner.policy.enabled(),
            "{} middleware ready",
            LOG_PREFIX
        );

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Rendered snippet, when injection is active.
    pub fn snippet(&self) -> Option<&str> {
        self.inner.injector.as_ref().map(Injector::snippet)
    }

    /// Wrap an axum router so every request goes through the edge.
    pub fn wrap<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(
            self.clone(),
            crate::http::middleware::umami_middleware,
        ))
    }

    /// Handle one request; `next` is the origin.
    pub async fn handle(&self, req: Request<Body>, next: Next) -> Response {
        let inner = &self.inner;

        if !inner.settings.is_valid() {
            tracing::debug!(path = %req.uri().path(), "Invalid configuration, passing through request");
            metrics::record_route("invalid_config");
            return next.run(req).await;
        }

        let route = inner.classifier.classify(&req);
        metrics::record_route(route.label());

        match route {
            Route::Forward { remainder } => self.forward(req, &remainder).await,
            Route::Passthrough => next.run(req).await,
            Route::TrackableGet => self.serve_get(req, next).await,
        }
    }

    async fn forward(&self, req: Request<Body>, remainder: &str) -> Response {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let id = request_id(req.headers()).to_string();

        match self.inner.gateway.forward(req, remainder, peer).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(request_id = %id, remainder = %remainder, error = %e, "Forwarding failed");
                e.into_response()
            }
        }
    }

    async fn serve_get(&self, req: Request<Body>, next: Next) -> Response {
        let inner = &self.inner;
        let view = inner
            .policy
            .admits(&req)
            .then(|| PageView::from_request(&req));

        let (response, outcome) = match &inner.injector {
            Some(injector) => injector.process(next.run(req).await).await,
            None => (next.run(req).await, InjectionOutcome::Skipped),
        };
        metrics::record_injection(outcome.label());

        if let Some(view) = view {
            if inner.policy.should_track(outcome.injected()) {
                inner.dispatcher.dispatch(view);
            }
        }

        response
    }
}

async fn build_snippet(
    settings: &Settings,
    client: &reqwest::Client,
    timeout: Duration,
) -> String {
    if settings.script_injection_mode == ScriptInjectionMode::Tag {
        return render_tag(settings);
    }

    let source = match fetch_tracker_source(client, settings, timeout).await {
        Ok(source) => Some(source),
        Err(e) => {
            tracing::warn!(error = %e, "{} tracker source unavailable, falling back to tag injection", LOG_PREFIX);
            None
        }
    };

    render_script(settings, source.as_deref()).unwrap_or_else(|_| render_tag(settings))
}
