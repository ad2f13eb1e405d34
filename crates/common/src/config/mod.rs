//! Configuration management for ScholarMap services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use crate::errors::AppError;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dataset upload configuration
    #[serde(default)]
    pub upload: UploadConfig,

    /// Dataset loading configuration
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Allowed CORS origins, `*` for any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Shared secret gating dataset uploads. Uploads are refused when unset.
    pub secret: Option<String>,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,

    /// Maximum number of data rows accepted per upload
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// CSV file ingested at startup, if any
    pub initial_path: Option<String>,

    /// Earliest accepted publication year
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    /// How many years past the current one are still accepted
    #[serde(default = "default_max_years_ahead")]
    pub max_years_ahead: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. `info`, `scholarmap=debug,tower_http=info`)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Expose Prometheus metrics on `/metrics`
    #[serde(default = "default_enabled")]
    pub metrics_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second on secret-checking routes
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_cors_origins() -> Vec<String> { vec!["*".to_string()] }
fn default_max_upload_bytes() -> usize { 20 * 1024 * 1024 }
fn default_max_rows() -> usize { 200_000 }
fn default_min_year() -> i32 { crate::MIN_PUBLICATION_YEAR }
fn default_max_years_ahead() -> i32 { 1 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_rate_limit() -> u32 { 5 }
fn default_burst() -> u32 { 10 }
fn default_enabled() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            secret: None,
            max_bytes: default_max_upload_bytes(),
            max_rows: default_max_rows(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            initial_path: None,
            min_year: default_min_year(),
            max_years_ahead: default_max_years_ahead(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_enabled(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__UPLOAD__SECRET=hunter2
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        let problem = if self.upload.max_bytes == 0 {
            Some("upload.max_bytes must be greater than 0")
        } else if self.upload.max_rows == 0 {
            Some("upload.max_rows must be greater than 0")
        } else if self.dataset.max_years_ahead < 0 {
            Some("dataset.max_years_ahead must not be negative")
        } else if self.rate_limit.enabled && self.rate_limit.requests_per_second == 0 {
            Some("rate_limit.requests_per_second must be greater than 0")
        } else {
            None
        };

        match problem {
            Some(message) => Err(AppError::Configuration {
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Latest accepted publication year relative to `current_year`
    pub fn max_publication_year(&self, current_year: i32) -> i32 {
        current_year + self.dataset.max_years_ahead
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upload: UploadConfig::default(),
            dataset: DatasetConfig::default(),
            observability: ObservabilityConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
