//! Metrics collection and exposition.
//!
//! # Metrics
//! - `umami_edge_requests_total` (counter): requests by route
//! - `umami_edge_injections_total` (counter): GET responses by injection outcome
//! - `umami_edge_tracking_dispatched_total` (counter): events accepted upstream
//! - `umami_edge_tracking_failures_total` (counter): events lost
//! - `umami_edge_forward_duration_seconds` (histogram): relay latency by status
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is optional and owns its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_route(route: &'static str) {
    metrics::counter!("umami_edge_requests_total", "route" => route).increment(1);
}

pub fn record_injection(outcome: &'static str) {
    metrics::counter!("umami_edge_injections_total", "outcome" => outcome).increment(1);
}

pub fn record_tracking_dispatched() {
    metrics::counter!("umami_edge_tracking_dispatched_total").increment(1);
}

pub fn record_tracking_failure() {
    metrics::counter!("umami_edge_tracking_failures_total").increment(1);
}

pub fn record_forward(status: u16, start: Instant) {
    metrics::histogram!(
        "umami_edge_forward_duration_seconds",
        "status" => status.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
