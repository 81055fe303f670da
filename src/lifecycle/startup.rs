//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter
//! - Resolve the analytics middleware
//! - Bind the listener and begin accepting traffic
//! - Translate OS signals into a shutdown broadcast
//!
//! # Design Decisions
//! - Fail fast on I/O problems (bind, client setup)
//! - An invalid `[umami]` table is not a startup failure
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::EdgeConfig;
use crate::error::EdgeError;
use crate::http::HttpServer;
use crate::lifecycle::{signals::shutdown_signal, Shutdown};
use crate::observability::metrics;
use crate::plugin::UmamiPlugin;

/// Run the edge until a shutdown signal arrives.
pub async fn run(config: EdgeConfig) -> Result<(), EdgeError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let plugin = UmamiPlugin::new(&config.umami, &config.timeouts).await?;
    let server = HttpServer::new(config.clone(), plugin)?;

    let addr: SocketAddr = config
        .listener
        .bind_address
        .parse()
        .map_err(|_| EdgeError::ListenerAddress(config.listener.bind_address.clone()))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    shutdown_signal().await;
    shutdown.trigger();

    // Give in-flight requests a bounded window to drain
    let drain = Duration::from_secs(config.timeouts.request_secs);
    match tokio::time::timeout(drain, server_task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed"),
        Err(_) => tracing::warn!("Drain window elapsed, exiting with requests in flight"),
    }

    Ok(())
}
