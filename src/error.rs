//! Error types and Result aliases for MosaicMux
//!
//! Failures of individual commands are not errors at this level: they are
//! turned into [`CmdRetval::Error`](crate::queue::CmdRetval) outcomes and shown
//! to the user through the queue's output routing. The types here cover the
//! collaborators around the queue (parsing, configuration, I/O).

use std::fmt;
use std::path::PathBuf;

/// Result type alias for MosaicMux operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for MosaicMux
#[derive(Debug)]
pub enum Error {
    // === Command errors ===
    /// No command with this name (or unique prefix) is registered
    UnknownCommand {
        name: String,
    },

    /// Prefix matches more than one command
    AmbiguousCommand {
        name: String,
        candidates: Vec<String>,
    },

    /// Command text could not be parsed
    ParseFailed {
        file: Option<String>,
        line: u32,
        reason: String,
    },

    /// Empty command
    EmptyCommand,

    /// Command needs a target and none could be resolved
    MissingTarget {
        command: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to save configuration file
    ConfigSaveFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration validation failed
    ConfigValidationFailed {
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Command errors
            Error::UnknownCommand { name } => {
                write!(f, "unknown command: {}", name)
            }
            Error::AmbiguousCommand { name, candidates } => {
                write!(f, "ambiguous command: {}, could be: {}", name, candidates.join(", "))
            }
            Error::ParseFailed { file, line, reason } => match file {
                Some(file) => write!(f, "{}:{}: {}", file, line, reason),
                None => write!(f, "{}", reason),
            },
            Error::EmptyCommand => {
                write!(f, "Command cannot be empty")
            }
            Error::MissingTarget { command } => {
                write!(f, "can't find target for '{}'", command)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigSaveFailed { path, reason } => {
                write!(f, "Failed to save config to '{}': {}", path.display(), reason)
            }
            Error::ConfigValidationFailed { reason } => {
                write!(f, "Configuration validation failed: {}", reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Toml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Error::ConfigValidationFailed {
            reason: err.to_string(),
        }
    }
}
