//! Tribunal expiry reconciler binary.
//!
//! Connects to PostgreSQL and the Discord HTTP API, then revokes elapsed
//! mutes on a timer until interrupted.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tribunal::{
    LogChannelNotifier, ModerationNotifier, ModerationRuntime, PostgresModerationStore,
    SerenityGateway, TracingNotifier, TribunalConfig, TribunalResult, init_observability,
};
use tribunal_database::DEFAULT_POOL_SIZE;

/// Revoke expired mutes on a fixed interval.
#[derive(Debug, Parser)]
#[command(name = "tribunal-reconciler", version, about)]
struct Cli {
    /// Configuration file (replaces the layered lookup)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: String,

    /// Connection pool size
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    pool_size: u32,

    /// Post events to each guild's log channel instead of only logging them
    #[arg(long)]
    log_channel: bool,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> TribunalResult<()> {
    // Load .env before clap reads env-backed arguments
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TribunalConfig::from_file(path)?,
        None => TribunalConfig::load()?,
    };
    init_observability(&config.observability())?;

    let store = Arc::new(PostgresModerationStore::new(&cli.database_url, cli.pool_size)?);
    store.run_migrations().await?;
    let gateway = Arc::new(SerenityGateway::connect(&cli.discord_token).await?);

    let notifier: Arc<dyn ModerationNotifier> = if cli.log_channel {
        Arc::new(LogChannelNotifier::new(gateway.clone(), store.clone()))
    } else {
        Arc::new(TracingNotifier::new())
    };
    let runtime = ModerationRuntime::new(config, store, gateway, notifier);

    if cli.once {
        let report = runtime.reconciler().run_pass().await?;
        info!(?report, "Single pass complete");
        return Ok(());
    }

    let handle = runtime.start_reconciler();
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for shutdown signal");
    }
    info!("Shutting down");
    handle.shutdown().await;
    Ok(())
}
