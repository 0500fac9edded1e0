use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use silly_api::api::rest;
use silly_api::api::AppState;
use silly_api::background::{CommitScheduler, WorkerManager};
use silly_api::config::AppConfig;
use silly_api::paste::PasteService;
use silly_api::secrets::{GitCommitter, Invalidator, SecretLog};
use silly_api::server::ServerHandle;

#[derive(Parser, Debug)]
#[command(name = "silly-api", version, about = "Paste store, secret mailbox and random generators")]
struct Cli {
    /// Path to the TOML config file; built-in defaults are used if it is missing.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("silly-api starting...");

    // Fails fast when no secrets repository is configured.
    let config = AppConfig::load(&cli.config)?;

    let pastes = Arc::new(PasteService::from_config(&config.paste)?);
    info!(backend = ?config.paste.backend, "Paste store ready");

    let committer = Arc::new(GitCommitter::new(
        config.secrets.repo_path.clone(),
        config.secrets.remote.clone(),
    ));
    let scheduler = CommitScheduler::new(
        committer,
        Duration::from_secs(config.secrets.fast_tick_sec),
        Duration::from_secs(config.secrets.slow_tick_sec),
    );
    let invalidator = Invalidator::new(
        SecretLog::new(config.secrets.repo_path.clone(), config.secrets.max_file_bytes),
        scheduler.dirty_flag(),
    );

    let background_workers = WorkerManager::start(scheduler, pastes.backend(), &config.paste)?;

    let state = AppState::new(
        pastes,
        invalidator,
        &config.secrets,
        config.generate.clone(),
    );
    let app = rest::router(state);

    let server_handle = ServerHandle::spawn(config.server.bind, app, background_workers);

    info!("silly-api ready to accept connections.");
    info!("REST API: http://{}", config.server.bind);
    info!(repo = %config.secrets.repo_path.display(), "Secrets repository");

    // Wait for shutdown
    server_handle.wait_for_shutdown().await;

    Ok(())
}
