use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod client;
mod config;
mod cricapi;
mod scores;
mod server;

use config::{Command, Config};
use cricapi::{CricApi, CricketProvider};
use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    match config.command.clone() {
        Command::Serve => serve(&config).await,
        Command::Watch { filter, match_id } => client::watch::run(&config, filter, match_id).await,
    }
}

async fn serve(config: &Config) -> Result<()> {
    let provider: Arc<dyn CricketProvider> = Arc::new(CricApi::new(config)?);
    info!(
        "Using provider {} at {} (timeout {:?})",
        provider.name(),
        config.cricapi_host,
        config.upstream_timeout()
    );
    if config.distinct_error_status {
        info!("Distinct error status enabled: not-found and malformed data get their own codes");
    }

    let app = server::router(AppState {
        provider,
        distinct_error_status: config.distinct_error_status,
    });
    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
