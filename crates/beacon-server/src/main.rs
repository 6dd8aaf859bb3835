//! Beacon Server
//!
//! Hands out VPN measurement descriptors over HTTP.

mod config;
mod handlers;
mod store;

use anyhow::{bail, Context};
use beacon_vpn::{HealthRegistry, HealthTable, Picker, ProviderRegistry, DEFAULT_MAX_AGE};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ServerConfig, CONFIG_FILE};
use crate::handlers::{router, AppState};
use crate::store::ExperimentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().compact())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon_server=info,beacon_vpn=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::load(Path::new(CONFIG_FILE)).context("loading configuration")?;
    let listen = config.listen_addr()?;

    let registry = ProviderRegistry::with_defaults(&config.providers)?;
    tracing::info!("Initializing providers: {}", registry.names().join(", "));

    let report = registry.bootstrap_all().await;
    if !report.all_ok() {
        if config.strict_bootstrap {
            let failed: Vec<&str> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
            bail!("bootstrap failed for: {}", failed.join(", "));
        }
        tracing::warn!(
            "Serving with {} of {} providers bootstrapped",
            report.succeeded.len(),
            registry.len()
        );
    }

    // Empty until a prober reports; unknown endpoints pass the gate
    let health = Arc::new(HealthRegistry::new());
    let health_tables: BTreeMap<String, Arc<HealthTable>> = registry
        .names()
        .into_iter()
        .map(|name| {
            let table = Arc::new(HealthTable::new());
            health.register(name.clone(), table.clone());
            (name, table)
        })
        .collect();
    spawn_health_pruning(health_tables.clone());

    let state = Arc::new(AppState {
        registry,
        picker: Picker::new(health),
        experiments: ExperimentStore::new(),
        health_tables,
        debug: config.debug,
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("Server listening on http://{}", listen);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drop probe results too old to matter
fn spawn_health_pruning(tables: BTreeMap<String, Arc<HealthTable>>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(DEFAULT_MAX_AGE);
        loop {
            interval.tick().await;
            for (provider, table) in &tables {
                let dropped = table.prune();
                if dropped > 0 {
                    tracing::debug!("{}: pruned {} stale health records", provider, dropped);
                }
            }
        }
    });
}
