//! Configuration management for MosaicMux
//!
//! Runtime settings for the command runner: how logging is set up and what
//! kind of client commands are run for. Loaded from TOML or JSON by
//! [`loader::ConfigLoader`], falling back to defaults.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::models::ClientFlags;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Main configuration structure for MosaicMux
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Client configuration
    pub client: ClientConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: String,

    /// Use the compact log formatter
    pub compact: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            compact: true,
        }
    }
}

/// Settings for the client commands are run on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Client name used in logs
    pub name: String,

    /// Client terminal supports UTF-8
    pub utf8: bool,

    /// Client speaks the control protocol
    pub control: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: "client0".to_string(),
            utf8: true,
            control: false,
        }
    }
}

impl ClientConfig {
    /// Client flags implied by this configuration
    pub fn flags(&self) -> ClientFlags {
        let mut flags = ClientFlags::NONE;
        if self.utf8 {
            flags.insert(ClientFlags::UTF8);
        }
        if self.control {
            flags.insert(ClientFlags::CONTROL);
        }
        flags
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0} (expected one of error, warn, info, debug, trace)")]
    InvalidLogLevel(String),

    #[error("Client name cannot be empty")]
    EmptyClientName,
}

impl Config {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }

        if self.client.name.trim().is_empty() {
            return Err(ConfigError::EmptyClientName);
        }

        Ok(())
    }
}
