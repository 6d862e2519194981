//! Configuration management for Eos
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{EosError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// EO cloud API connection configuration
    pub cloud: CloudConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

/// EO cloud API connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Base URL of the EO cloud API
    pub base_url: String,

    /// Account username (email)
    pub username: String,

    /// Account password
    pub password: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Optional charger serial to select when the account has several;
    /// the first listed charger is used when unset
    #[serde(default)]
    pub serial: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level override
    #[serde(default)]
    pub console_level: Option<String>,

    /// Optional file-specific level override
    #[serde(default)]
    pub file_level: Option<String>,

    /// Path to log file
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    #[serde(default = "default_true")]
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eoappi.eocharging.com".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: 10,
            serial: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/eos.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cloud: CloudConfig::default(),
            logging: LoggingConfig::default(),
            poll_interval_ms: 30_000,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        let default_paths = [
            "eos_config.yaml",
            "/data/eos_config.yaml",
            "/etc/eos/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.cloud.base_url.is_empty() {
            return Err(EosError::validation(
                "cloud.base_url",
                "Base URL cannot be empty",
            ));
        }

        if self.cloud.username.is_empty() {
            return Err(EosError::validation(
                "cloud.username",
                "Username cannot be empty",
            ));
        }

        if self.cloud.timeout_seconds == 0 {
            return Err(EosError::validation(
                "cloud.timeout_seconds",
                "Must be greater than 0",
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(EosError::validation(
                "poll_interval_ms",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}
