//! # Fear & Greed REST API
//!
//! Serves the latest CNN Fear & Greed snapshot as JSON:
//! `/`, `/score`, `/signal`, `/indicator/{name}`, `/historical?limit=N`
//! and `/health`. Snapshots are cached for `cache_ttl_secs` (300 by default).

use anyhow::Result;
use fgi_servers::api_logic::{self, ApiState};
use fgi_servers::common::{config, fear_and_greed_client, logger};
use std::net::SocketAddr;
use tokio::signal;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config(DEFAULT_PORT);
    logger::setup_logging(&config.log_dir(), config.log_level(), "server_api", logger::Console::Stdout)?;

    let fgi = fear_and_greed_client("server_api", &config)?;
    let app = api_logic::router(ApiState::new(fgi, config.cache_ttl()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    log::info!("Starting Fear & Greed API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            log::info!("Ctrl-C received, initiating shutdown.");
        })
        .await?;

    log::info!("Shutdown complete.");
    Ok(())
}
