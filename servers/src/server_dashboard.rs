//! # Fear & Greed Web Dashboard
//!
//! Server-rendered HTML dashboard: gauge, market summary, history chart and
//! indicator bars. `/refresh` clears the snapshot cache, `/status` reports
//! the server clock.

use actix_web::{App, HttpServer, middleware};
use fgi_servers::common::{config, fear_and_greed_client, logger};
use fgi_servers::dashboard_logic::{self, DashboardState};

const DEFAULT_PORT: u16 = 8501;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load_config(DEFAULT_PORT);
    logger::setup_logging(&config.log_dir(), config.log_level(), "server_dashboard", logger::Console::Stdout)?;

    let fgi = fear_and_greed_client("server_dashboard", &config)?;
    let state = DashboardState::new(fgi, config.cache_ttl());

    let port = config.port();
    log::info!("Starting Fear & Greed dashboard on http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(dashboard_logic::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
