//! # Client Configuration
//!
//! ```toml
//! [api]
//! endpoint = "https://print.example.edu/default/lambda_print"
//!
//! [form]
//! color_option = true
//! expect_job_id = true
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section is optional; missing fields fall back to their defaults.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/default/lambda_print";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main configuration struct for the print client.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub form: FormVariant,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote print API location.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Serves both the credential request (GET) and the job log (POST).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

/// Which form variant is active.
///
/// The full form offers a color checkbox and shows the job id returned by the
/// queue; the basic form does neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormVariant {
    #[serde(default = "default_true")]
    pub color_option: bool,
    #[serde(default = "default_true")]
    pub expect_job_id: bool,
}

impl FormVariant {
    pub const FULL: FormVariant = FormVariant {
        color_option: true,
        expect_job_id: true,
    };
    pub const BASIC: FormVariant = FormVariant {
        color_option: false,
        expect_job_id: false,
    };
}

impl Default for FormVariant {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn max_level(&self) -> Result<tracing::Level, ConfigError> {
        self.level
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.level)))
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api.endpoint)
            .map_err(|e| ConfigError::Invalid(format!("api.endpoint '{}': {}", self.api.endpoint, e)))?;
        if url.host_str().is_none() {
            return Err(ConfigError::Invalid(format!(
                "api.endpoint '{}' has no host",
                self.api.endpoint
            )));
        }
        self.logging.max_level()?;
        Ok(())
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(config) => {
                config.validate()?;
                Ok(config)
            }
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            Err(ConfigError::Io(e))
        }
    }
}
