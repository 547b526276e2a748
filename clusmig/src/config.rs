//! Configuration for the cluster-aware driver
//!
//! Supports loading configuration from a TOML file.

use std::path::Path;

use clus::{FailbackPolicy, FailbackType};
use serde::Deserialize;
use thiserror::Error;

/// Driver configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Cluster settings
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Failback policy stamped on newly clustered VMs
    #[serde(default)]
    pub failback: FailbackConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cluster-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClusterConfig {
    /// Apply cluster hooks and clustered migration (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Failback configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FailbackConfig {
    /// Keep the group's online state across cluster restarts (default: true)
    #[serde(default = "default_true")]
    pub persistent_state: bool,

    /// Fail back to the preferred owner when it rejoins (default: true)
    #[serde(default = "default_true")]
    pub auto_failback: bool,

    /// First hour of the failback window (default: 0)
    #[serde(default = "default_window_start")]
    pub window_start: u8,

    /// Last hour of the failback window (default: 23)
    #[serde(default = "default_window_end")]
    pub window_end: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level filter (default: "clusmig=info,clus=info")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_window_start() -> u8 {
    FailbackPolicy::WINDOW_MIN
}

fn default_window_end() -> u8 {
    FailbackPolicy::WINDOW_MAX
}

fn default_log_level() -> String {
    "clusmig=info,clus=info".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for FailbackConfig {
    fn default() -> Self {
        Self {
            persistent_state: default_true(),
            auto_failback: default_true(),
            window_start: default_window_start(),
            window_end: default_window_end(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl FailbackConfig {
    pub fn policy(&self) -> FailbackPolicy {
        FailbackPolicy {
            persistent_state: self.persistent_state,
            auto_failback: if self.auto_failback {
                FailbackType::Enabled
            } else {
                FailbackType::Disabled
            },
            window_start: self.window_start,
            window_end: self.window_end,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e.to_string()))?;

        Self::parse(&content)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e.to_string()))
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, hour) in [
            ("failback.window_start", self.failback.window_start),
            ("failback.window_end", self.failback.window_end),
        ] {
            if hour > FailbackPolicy::WINDOW_MAX {
                return Err(ConfigError::Invalid(format!(
                    "{} must be an hour between 0 and 23, got {}",
                    key, hour
                )));
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    ReadError(String, String),

    #[error("Failed to parse config file '{0}': {1}")]
    ParseError(String, String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
