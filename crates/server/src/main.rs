//! bpmchain HTTP service entry point.

use anyhow::{Context, Result};
use bpmchain_chain::ChainStore;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod api;
mod cli;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let store = Arc::new(ChainStore::new());
    let genesis = store.head()?;
    info!(hash = %genesis.hash(), timestamp = %genesis.timestamp(), "genesis block created");
    debug!(block = ?genesis, "genesis");

    let addr = cli.listen_addr()?;
    let app = api::create_router(api::AppState::new(store));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
