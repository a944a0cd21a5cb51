//! HTTP API command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use signals_access::InMemoryCounterStore;
use signals_api::{create_router, serve, AppState, ServiceInfo};
use signals_config::AppConfig;
use signals_data::JsonFileStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cli::ServeArgs;

const PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

pub async fn run(args: ServeArgs, config: AppConfig) -> Result<()> {
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr = tokio::net::lookup_host((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to resolve {}:{}", host, port))?
        .next()
        .with_context(|| format!("No address for {}:{}", host, port))?;

    let tiers = Arc::new(config.tier_table());
    let store = Arc::new(JsonFileStore::new(config.data_paths()));
    let counters = Arc::new(InMemoryCounterStore::new());

    let service = ServiceInfo {
        name: config.app.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: config.app.environment.clone(),
    };
    let state = Arc::new(AppState::new(
        service,
        tiers,
        store.clone(),
        counters,
        store.clone(),
        store,
        &config.webhooks.signature_header,
    ));

    let pruner = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            match pruner.limiter.prune(Utc::now()).await {
                Ok(removed) => debug!(removed, "Pruned stale rate counters"),
                Err(e) => warn!(error = %e, "Rate counter pruning failed"),
            }
        }
    });

    info!(
        data = ?config.data_paths(),
        public_dir = ?config.server.public_dir,
        "Starting signals API"
    );

    let router = create_router(state, config.server.public_dir.as_deref());
    serve(router, addr, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Signals API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
