//! Configuration module for guichet.
//!
//! Process configuration lives in `config.toml`. SMTP transport settings are
//! deliberately not part of this file; they come from environment variables
//! and are validated at first use (see [`crate::mailer::TransportConfig`]).

use serde::Deserialize;
use std::path::Path;

use crate::{GuichetError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means permissive (development mode).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Contact endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactConfig {
    /// Include transport failure details in 500 response bodies.
    ///
    /// Keep this off in production: with it on, the underlying SMTP error
    /// message and status code are returned to the caller.
    #[serde(default)]
    pub verbose_errors: bool,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            verbose_errors: false,
        }
    }
}

/// Rate limit configuration for the contact endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Maximum submissions allowed per client within the window.
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_submissions() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    600
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_secs: default_window_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/guichet.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Contact endpoint configuration.
    #[serde(default)]
    pub contact: ContactConfig,
    /// Rate limit configuration.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GuichetError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GuichetError::Config(format!("config parse error: {e}")))
    }
}
