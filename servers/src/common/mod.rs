//! Configuration, logging and client wiring shared by the three servers.

pub mod config;
pub mod logger;

use config::ServerConfig;
use lib_common::core::FgiError;
use lib_common::loggers::{LoggerLocal, LoggerLocalOptions};
use lib_common::markets::cnn::{ApiCallCnn, FearAndGreed};
use std::sync::Arc;

/// Builds the fetch-and-build client from `config`. Library logs go to a
/// file in the configured log directory, never to the terminal.
pub fn fear_and_greed_client(app_name: &str, config: &ServerConfig) -> Result<Arc<FearAndGreed>, FgiError> {
    let options = LoggerLocalOptions::file_only(Some(config.log_dir()));
    let logger = Arc::new(LoggerLocal::new(app_name.to_string(), Some(options)));
    let api_call = Arc::new(ApiCallCnn::with_options(config.cnn_options(), logger.clone())?);
    Ok(Arc::new(FearAndGreed::new(api_call, logger)))
}
