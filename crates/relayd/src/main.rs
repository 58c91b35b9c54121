//! relayd: proposer-facing builder relay daemon.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use relay_api::ApiState;
use relay_core::config::{DatastoreBackend, DatastoreConfig, RelayConfig};
use relay_core::{EndpointIdentity, KnownValidator, NetworkDomain};
use relay_services::{
    KnownValidatorRefresher, MemoryStore, ProposerDatastore, SqliteStore, StatsAggregator,
    ValidatorStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = RelayConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = RelayConfig::load().context("failed to load config")?;

    let network = NetworkDomain::resolve(&config.network.name).with_context(|| {
        format!(
            "supported networks: {}",
            relay_core::network::supported_networks().join(", ")
        )
    })?;
    tracing::info!(
        network = %network.name,
        genesis_fork_version = %network.genesis_fork_version_hex,
        signing_domain = %network.signing_domain_hex(),
        "relayd starting"
    );

    let builders = config
        .builders
        .iter()
        .map(|b| EndpointIdentity::parse(b).with_context(|| format!("invalid builder entry {b:?}")))
        .collect::<Result<Vec<_>>>()?;
    for b in &builders {
        tracing::info!(address = %b.address(), pubkey = %b.pubkey_hex(), "builder configured");
    }

    // ── Datastore ────────────────────────────────────────────────────────────
    let store = open_store(&config.datastore)?;
    if let Some(path) = &config.datastore.known_validators_path {
        seed_known_validators(store.as_ref(), path).await?;
    }
    let datastore = Arc::new(ProposerDatastore::new(store));
    let stats = StatsAggregator::new();

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Known validators ─────────────────────────────────────────────────────
    let refresher = KnownValidatorRefresher::new(
        datastore.clone(),
        stats.clone(),
        config.refresh_interval(),
        shutdown_tx.subscribe(),
    );
    refresher
        .initial_refresh()
        .await
        .context("initial known validator refresh failed")?;

    let refresher_task = tokio::spawn(refresher.run());

    // ── API ──────────────────────────────────────────────────────────────────
    let state = ApiState::new(datastore, network, builders, stats);
    let api_task = {
        let listen_addr = config.api.listen_addr.clone();
        let port = config.api.port;
        let shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = relay_api::serve(state, &listen_addr, port, shutdown).await {
                tracing::error!(error = %e, "API server failed");
            }
        })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = refresher_task     => tracing::error!("refresher exited: {:?}", r),
        r = api_task           => tracing::error!("API task exited: {:?}", r),
    }

    Ok(())
}

fn open_store(config: &DatastoreConfig) -> Result<Arc<dyn ValidatorStore>> {
    let store: Arc<dyn ValidatorStore> = match config.backend {
        DatastoreBackend::Memory => Arc::new(MemoryStore::new()),
        DatastoreBackend::Sqlite => Arc::new(
            SqliteStore::open(&config.sqlite_path)
                .with_context(|| format!("failed to open {}", config.sqlite_path.display()))?,
        ),
    };
    tracing::info!(backend = store.backend(), "datastore opened");
    Ok(store)
}

/// Load a JSON array of `{pubkey, index}` into the store's eligible set.
async fn seed_known_validators(store: &dyn ValidatorStore, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let validators: Vec<KnownValidator> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    store.replace_known_validators(&validators).await?;
    tracing::info!(count = validators.len(), path = %path.display(), "seeded known validators");
    Ok(())
}
