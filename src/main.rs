mod algorand;
mod bootstrap;
mod config;
mod error;
mod ledger;
mod node;
mod settlement;
mod watcher;

#[cfg(test)]
mod test_utils;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,ledger_watcher=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("🚀 Starting ledger watcher");

    let config = config::Config::from_env().context("failed to load configuration")?;
    let mut watch = bootstrap::initialize_watch_loop(&config)
        .await
        .context("failed to initialize watcher")?;

    // Only returns on a fatal error
    let err = watch.start().await;
    error!(
        "🛑 Watcher stopped in state {} at round {}: {}",
        watch.state(),
        watch.tracked_round(),
        err
    );

    Err(err).context("watch loop halted")
}
