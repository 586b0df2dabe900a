//! Minimal HTTP service scaffold.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                HELLO SERVICE                 │
//!                      │                                              │
//!   Client Request     │  ┌──────────┐   ┌───────────┐   ┌─────────┐ │
//!   ───────────────────┼─▶│ listener │──▶│ dispatch  │──▶│  route  │ │
//!                      │  │ (axum)   │   │  table    │   │ handle  │ │
//!                      │  └──────────┘   └─────┬─────┘   └────┬────┘ │
//!                      │                       │ miss         │      │
//!   Client Response    │                       ▼              ▼      │
//!   ◀──────────────────┼── fixed 404      instrumented wrapper       │
//!                      │                  (count + time)             │
//!                      │                                              │
//!                      │  ┌────────────────────────────────────────┐ │
//!                      │  │          Cross-Cutting Concerns        │ │
//!                      │  │  config   metrics registry   lifecycle │ │
//!                      │  │                               hooks    │ │
//!                      │  └────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! Routes: `GET /` greeting, `POST /` echo, `GET /metrics` exposition.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hello_service::config::{load_config, ServiceConfig};
use hello_service::lifecycle::{HookError, LifecycleHook, ServiceManager, StopError};
use hello_service::observability::{MetricsRegistry, RequestMetrics};
use hello_service::routes::{EchoRoute, HelloRoute, MetricsRoute};

#[derive(Parser)]
#[command(name = "hello-service", version, about = "Minimal HTTP service scaffold")]
struct Cli {
    /// Path to a TOML config file; defaults apply when absent.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Logs a final metrics snapshot while the service shuts down.
struct MetricsSnapshotHook {
    registry: Arc<MetricsRegistry>,
}

impl LifecycleHook for MetricsSnapshotHook {
    fn name(&self) -> &str {
        "metrics-snapshot"
    }

    fn on_stop(&self, _remaining: Duration) -> Result<(), HookError> {
        let snapshot = self.registry.render();
        tracing::info!(
            lines = snapshot.lines().count(),
            "final metrics snapshot"
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hello_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("hello-service v0.1.0 starting");

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        grace_secs = config.shutdown.grace_secs,
        metrics_enabled = config.observability.metrics_enabled,
        "configuration loaded"
    );

    let registry = Arc::new(MetricsRegistry::new());
    let metrics = RequestMetrics::register(&registry)?;

    let grace = Duration::from_secs(config.shutdown.grace_secs);
    let metrics_enabled = config.observability.metrics_enabled;

    let mut manager = ServiceManager::new(config, Some(metrics));
    manager.register_route(Arc::new(HelloRoute))?;
    manager.register_route(Arc::new(EchoRoute))?;
    if metrics_enabled {
        manager.register_route(Arc::new(MetricsRoute::new(registry.clone())))?;
    }
    manager.register_hook(Arc::new(MetricsSnapshotHook { registry }))?;

    manager.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    match manager.stop(grace).await {
        Ok(()) => {}
        Err(StopError::GraceExpired) => {
            tracing::warn!("some requests did not finish within the grace deadline");
        }
        Err(e) => tracing::error!(error = %e, "shutdown failed"),
    }

    tracing::info!("shutdown complete");
    Ok(())
}
