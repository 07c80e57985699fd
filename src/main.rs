//! Load balancer control plane (v1)
//!
//! Serves the health monitor management API for a seeded load balancer
//! resource tree.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────────────┐
//!                       │                     CONTROL PLANE                         │
//!                       │                                                           │
//!   API Request         │  ┌─────────┐    ┌────────────┐    ┌──────────────┐        │
//!   ────────────────────┼─▶│  http   │───▶│   admin    │───▶│   control    │        │
//!                       │  │ server  │    │  handlers  │    │  controller  │        │
//!                       │  └─────────┘    └────────────┘    └──────┬───────┘        │
//!                       │                                          │                │
//!                       │                          claim / persist │ hand-off       │
//!                       │                                          ▼                │
//!                       │                 ┌──────────────┐  ┌──────────────┐        │
//!                       │                 │  repository  │◀─│   executor   │        │
//!                       │                 │  (in-memory) │  │ queue+worker │        │
//!                       │                 └──────────────┘  └──────────────┘        │
//!                       │                                                           │
//!                       │  ┌─────────────────────────────────────────────────────┐  │
//!                       │  │  config (reload) · observability · lifecycle        │  │
//!                       │  └─────────────────────────────────────────────────────┘  │
//!                       └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use lb_control_plane::config::{load_config, ConfigWatcher, ControlPlaneConfig};
use lb_control_plane::http::HttpServer;
use lb_control_plane::lifecycle::{build_services, signals::spawn_signal_handler, Shutdown};
use lb_control_plane::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "lb-control-plane")]
#[command(about = "Load balancer control plane", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "LB_CONTROL_PLANE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ControlPlaneConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lb-control-plane starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        load_balancers = config.topology.load_balancers.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let services = build_services(&config)?;
    let shutdown = Shutdown::new();

    let worker = tokio::spawn(services.worker.run(shutdown.subscribe()));

    // The watcher stops when its handle is dropped, so keep it for the whole run.
    let (_watch_handle, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    spawn_signal_handler(shutdown.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, services.controller);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Provisioning worker panicked");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
