//! # Fear & Greed MCP Server
//!
//! Exposes the index to AI assistants through the Model Context Protocol on
//! stdin/stdout. Logs go to a file only; stdout is reserved for frames.

use anyhow::Result;
use fgi_servers::common::{config, fear_and_greed_client, logger};
use fgi_servers::mcp_logic::McpServer;
use tokio::io::{BufReader, stdin, stdout};

// Unused by stdio transport; keeps config defaults uniform across servers.
const DEFAULT_PORT: u16 = 0;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config(DEFAULT_PORT);
    logger::setup_logging(&config.log_dir(), config.log_level(), "server_mcp", logger::Console::None)?;

    let fgi = fear_and_greed_client("server_mcp", &config)?;
    let server = McpServer::new(fgi);

    log::info!("MCP server ready on stdio");
    server.run(BufReader::new(stdin()), stdout()).await?;
    log::info!("stdin closed, exiting");
    Ok(())
}
