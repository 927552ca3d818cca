//! # fgi_servers
//!
//! Network front-ends over `lib_common`'s Fear & Greed snapshot:
//!
//! - **`api_logic`**: axum REST API with a five minute snapshot cache.
//! - **`dashboard_logic`**: actix-web HTML dashboard with inline SVG charts.
//! - **`mcp_logic`**: JSON-RPC tool server for AI assistants over stdio.
//! - **`common`**: config loading, `fern` logging and client wiring.

pub mod api_logic;
pub mod common;
pub mod dashboard_logic;
pub mod mcp_logic;

#[cfg(test)]
pub(crate) mod test_support;
