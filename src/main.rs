//! Umami analytics edge.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                 UMAMI EDGE                     │
//!   Client Request    │  ┌──────────┐    ┌────────────┐                │
//!   ──────────────────┼─▶│  http    │───▶│  routing   │                │
//!                     │  │  server  │    │ classifier │                │
//!                     │  └──────────┘    └─────┬──────┘                │
//!                     │        ┌───────────────┼──────────────┐        │
//!                     │        ▼               ▼              ▼        │
//!                     │  ┌──────────┐   ┌────────────┐  ┌──────────┐   │
//!                     │  │ forward  │   │passthrough │  │  inject  │   │
//!                     │  │ gateway  │   │  (origin)  │  │ + origin │   │
//!                     │  └────┬─────┘   └────────────┘  └────┬─────┘   │
//!                     │       │                              ▼         │
//!                     │       │                        ┌──────────┐    │
//!                     │       │                        │ tracking │    │
//!                     │       │                        │(detached)│    │
//!                     │       ▼                        └────┬─────┘    │
//!                     └───────┼─────────────────────────────┼──────────┘
//!                             ▼                             ▼
//!                       Umami host                    Umami /api/send
//! ```

use std::path::PathBuf;

use clap::Parser;

use umami_edge::config::{load_config, EdgeConfig};
use umami_edge::lifecycle::startup;
use umami_edge::observability::logging;

#[derive(Parser)]
#[command(name = "umami-edge")]
#[command(about = "Analytics edge proxy for Umami", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("umami-edge v{} starting", env!("CARGO_PKG_VERSION"));
    if cli.config.is_none() {
        tracing::warn!("No --config given, running with defaults");
    }

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
