pub mod toml_config;

use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
pub use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "symcalc")]
#[command(about = "HTTP service for symbolic differentiation and integration")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Address to bind (default 127.0.0.1)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to listen on (default 5000)")]
    pub port: Option<u16>,

    #[arg(long, help = "Per-request computation timeout in seconds (default 10)")]
    pub request_timeout: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }
        if let Some(host) = &self.host {
            validation::validate_non_empty_string("host", host)?;
        }
        if let Some(port) = self.port {
            validation::validate_port("port", port)?;
        }
        if let Some(timeout) = self.request_timeout {
            validation::validate_range("request_timeout", timeout, 1, 3600)?;
        }
        Ok(())
    }
}

/// Effective settings after merging CLI flags over the optional config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

impl ServerSettings {
    /// CLI flags win over file values, which win over defaults.
    pub fn resolve(cli: &CliConfig, file: Option<&TomlConfig>) -> Self {
        let server = file.map(|f| &f.server);
        Self {
            host: cli
                .host
                .clone()
                .or_else(|| server.and_then(|s| s.host.clone()))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli
                .port
                .or_else(|| server.and_then(|s| s.port))
                .unwrap_or(DEFAULT_PORT),
            request_timeout_seconds: cli
                .request_timeout
                .or_else(|| server.and_then(|s| s.request_timeout_seconds))
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            log_level: file.and_then(|f| f.logging.level.clone()),
            json_logs: cli.json_logs || file.is_some_and(TomlConfig::json_logs),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Validate for ServerSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("host", &self.host)?;
        validation::validate_port("port", self.port)?;
        validation::validate_range("request_timeout", self.request_timeout_seconds, 1, 3600)?;
        Ok(())
    }
}
