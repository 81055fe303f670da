//! Detached delivery of pageview events.
//!
//! Delivery is at most once and best effort. Each event is sent from a
//! spawned task whose handle is dropped on the spot: nothing awaits it,
//! nothing reports its result back, and it is not tied to the lifetime of
//! the request that produced it. Failures end up in logs and metrics only.

use std::time::Duration;

use reqwest::header::{HeaderValue, USER_AGENT};

use crate::observability::metrics;
use crate::tracking::event::{PageView, TrackingEvent};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    endpoint: String,
    website_id: String,
    timeout: Duration,
}

impl Dispatcher {
    /// `umami_host` without trailing slash.
    pub fn new(
        client: reqwest::Client,
        umami_host: &str,
        website_id: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/send", umami_host),
            website_id: website_id.to_string(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fire and forget. Returns immediately.
    pub fn dispatch(&self, view: PageView) {
        let this = self.clone();
        tokio::spawn(async move {
            match tokio::time::timeout(this.timeout, this.send(&view)).await {
                Ok(Ok(())) => {
                    metrics::record_tracking_dispatched();
                    tracing::debug!(url = %view.url, "Tracking event sent");
                }
                Ok(Err(e)) => {
                    metrics::record_tracking_failure();
                    tracing::debug!(url = %view.url, error = %e, "Tracking event failed");
                }
                Err(_) => {
                    metrics::record_tracking_failure();
                    tracing::debug!(url = %view.url, "Tracking event timed out");
                }
            }
        });
    }

    async fn send(&self, view: &PageView) -> Result<(), reqwest::Error> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&TrackingEvent::pageview(&self.website_id, view));

        if let Some(agent) = view
            .user_agent
            .as_deref()
            .and_then(|ua| HeaderValue::from_str(ua).ok())
        {
            request = request.header(USER_AGENT, agent);
        }
        if let Some(ip) = view.client_ip {
            request = request.header("x-forwarded-for", ip.to_string());
        }

        request.send().await?.error_for_status()?;
        Ok(())
    }
}
