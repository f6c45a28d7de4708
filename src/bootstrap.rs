use std::{sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::{
    config::Config,
    error::AppResult,
    ledger::LedgerRepository,
    node::AlgodClient,
    settlement::SettlementBuilder,
    watcher::WatchLoop,
};

/// Wire the watch loop from configuration. Nothing is polled until `start`.
pub async fn initialize_watch_loop(config: &Config) -> AppResult<WatchLoop> {
    info!("Initializing watcher components ...");

    // Keys first: a bad mnemonic should fail before any I/O
    let settlement = SettlementBuilder::from_mnemonics(
        &config.monitored_mnemonic,
        &config.destination_mnemonic,
    )?;
    info!(
        "✅ Settlement accounts loaded: {} -> {}",
        settlement.source().address(),
        settlement.destination().address()
    );

    let pool = initialize_database(&config.database_url).await?;
    let store = Arc::new(LedgerRepository::new(pool));

    let node = Arc::new(AlgodClient::new(config.node_config())?);
    info!("✅ Node client configured for {}", config.algod_url);

    Ok(WatchLoop::new(node, store, settlement))
}

async fn initialize_database(database_url: &str) -> AppResult<PgPool> {
    info!("📊 Connecting to database...");

    // The loop is strictly sequential: a handful of connections is plenty
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("✓ Database initialized");
    Ok(pool)
}
