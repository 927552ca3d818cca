use clap::Parser;
use lib_common::markets::cnn::apicallcnn::{CnnOptions, CNN_BASE_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when `--config-path` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fgi_server.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[clap(about = "CNN Fear & Greed Index server", version)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[clap(long, env = "FGI_PORT", help = "Port to listen on.")]
    pub port: Option<u16>,

    #[clap(long, env = "FGI_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "FGI_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "FGI_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "FGI_ENDPOINT", help = "Base URL of the CNN dataviz API.")]
    pub endpoint: Option<String>,

    #[clap(long, env = "FGI_TIMEOUT_SECS", help = "Upstream request timeout in seconds.")]
    pub timeout_secs: Option<u64>,

    #[clap(long, env = "FGI_RETRIES", help = "Extra upstream attempts on transient failures.")]
    pub retries: Option<u32>,

    #[clap(long, env = "FGI_CACHE_TTL_SECS", help = "How long a fetched snapshot is served from cache.")]
    pub cache_ttl_secs: Option<u64>,
}

impl ServerConfig {
    /// Built-in defaults for a server listening on `port`.
    pub fn defaults(port: u16) -> Self {
        ServerConfig {
            port: Some(port),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            endpoint: Some(CNN_BASE_URL.to_string()),
            timeout_secs: Some(30),
            retries: Some(0),
            cache_ttl_secs: Some(300),
            ..Default::default()
        }
    }

    // Merge two configs, where 'other' overrides 'self' for Some values
    fn merge(self, other: ServerConfig) -> ServerConfig {
        ServerConfig {
            port: other.port.or(self.port),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            endpoint: other.endpoint.or(self.endpoint),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            retries: other.retries.or(self.retries),
            cache_ttl_secs: other.cache_ttl_secs.or(self.cache_ttl_secs),
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8000)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("./logs"))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.unwrap_or(300))
    }

    /// Upstream connection settings.
    pub fn cnn_options(&self) -> CnnOptions {
        let defaults = CnnOptions::default();
        CnnOptions {
            base_url: self.endpoint.clone().unwrap_or(defaults.base_url),
            timeout: self.timeout_secs.map(Duration::from_secs).unwrap_or(defaults.timeout),
            retries: self.retries.unwrap_or(defaults.retries),
        }
    }
}

fn read_config_file(path: &Path) -> Option<ServerConfig> {
    if !path.exists() {
        log::info!("Config file not found at {}. Using defaults and environment/CLI variables.", path.display());
        return None;
    }
    match fs::read_to_string(path) {
        Ok(config_str) => match serde_json::from_str::<ServerConfig>(&config_str) {
            Ok(file_config) => Some(file_config),
            Err(e) => {
                log::warn!("Failed to parse config file {}: {}. Falling back to other sources.", path.display(), e);
                None
            }
        },
        Err(e) => {
            log::warn!("Failed to read config file {}: {}. Falling back to other sources.", path.display(), e);
            None
        }
    }
}

/// Layers defaults, then the JSON config file, then CLI/env values.
pub fn resolve_config(defaults: ServerConfig, cli: ServerConfig) -> ServerConfig {
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = defaults;
    if let Some(file_config) = read_config_file(&config_file_path) {
        current_config = current_config.merge(file_config);
    }
    current_config.merge(cli)
}

/// Loads `.env`, parses CLI/env and resolves the final config.
pub fn load_config(default_port: u16) -> ServerConfig {
    let _ = dotenvy::dotenv();
    resolve_config(ServerConfig::defaults(default_port), ServerConfig::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_overrides_defaults_and_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fgi_server.conf");
        fs::write(&path, r#"{"port": 9100, "cacheTtlSecs": 60, "logLevel": "debug"}"#).unwrap();

        let cli = ServerConfig {
            config_path: Some(path),
            port: Some(9200),
            ..Default::default()
        };
        let config = resolve_config(ServerConfig::defaults(8000), cli);

        assert_eq!(config.port(), 9200);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.cnn_options().base_url, CNN_BASE_URL);
    }

    #[test]
    fn test_bad_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.conf");
        fs::write(&path, "not json").unwrap();

        let cli = ServerConfig { config_path: Some(path), ..Default::default() };
        let config = resolve_config(ServerConfig::defaults(8501), cli);

        assert_eq!(config.port(), 8501);
        assert_eq!(config.cnn_options().timeout, Duration::from_secs(30));
        assert_eq!(config.cnn_options().retries, 0);
    }

    #[test]
    fn test_parses_flags() {
        let cli = ServerConfig::parse_from([
            "server_api",
            "--endpoint",
            "http://127.0.0.1:1/",
            "--timeout-secs",
            "5",
        ]);
        assert_eq!(cli.endpoint.as_deref(), Some("http://127.0.0.1:1/"));
        assert_eq!(cli.timeout_secs, Some(5));
    }
}
