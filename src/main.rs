// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use chat_relay::archive::{MessageArchive, spawn_snapshot_task};
use chat_relay::config::Config;
use chat_relay::state::AppState;
use chat_relay::websocket::router;

/// The main entry point for our application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::parse();

    // Load whatever the last snapshot left behind. A missing file is a cold
    // start; a corrupt one aborts startup so the operator can deal with it.
    let archive = Arc::new(MessageArchive::new());
    let restored = archive
        .restore(&config.snapshot_path)
        .await
        .with_context(|| {
            format!(
                "failed to load archive snapshot from {}",
                config.snapshot_path.display()
            )
        })?;
    if restored > 0 {
        info!(restored, "restored archive snapshot");
    }

    // The snapshot timer runs for the life of the process, independent of any
    // session; it is never stopped here and dies with the process.
    let _snapshot_task = spawn_snapshot_task(
        Arc::clone(&archive),
        config.snapshot_path.clone(),
        Duration::from_secs(config.snapshot_interval),
    );

    let state = AppState::with_archive(archive);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "chat server listening");
    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
