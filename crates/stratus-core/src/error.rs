//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building configuration options.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Option name is not recognized.
    #[error("Unknown configuration option: {0}")]
    UnknownOption(String),

    /// Service code is not recognized.
    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// Option value could not be parsed.
    #[error("Invalid value for {option}: {value}")]
    InvalidValue { option: String, value: String },

    /// Failed to read a configuration file.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(option: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            option: option.into(),
            value: value.into(),
        }
    }
}
