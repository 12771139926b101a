//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between a configuration source and a
/// validated [`CerberusConfig`](crate::CerberusConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The named configuration file does not exist.
    #[error("no configuration file at {path}")]
    FileNotFound {
        /// Path that was probed.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("could not read configuration file {path}")]
    FileRead {
        /// Path of the unreadable file.
        path: PathBuf,
        /// I/O error from the read.
        #[source]
        source: std::io::Error,
    },

    /// TOML content did not parse.
    #[error("TOML configuration does not parse: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON content did not parse.
    #[error("JSON configuration does not parse: {0}")]
    Json(#[from] serde_json::Error),

    /// A field holds a value the gate cannot run with.
    #[error("configuration field {field} is invalid: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// An environment override did not parse as the field's type.
    #[error("environment override {var} is invalid: {reason}")]
    EnvOverride {
        /// Name of the environment variable.
        var: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// The assembled configuration failed a cross-field check.
    #[error("configuration rejected: {0}")]
    Validation(String),
}

impl ConfigError {
    /// A [`ConfigError::FileNotFound`] for this path.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// A [`ConfigError::FileRead`] wrapping the I/O failure.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// A [`ConfigError::InvalidValue`] for this field.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A [`ConfigError::EnvOverride`] for this variable.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvOverride {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// A [`ConfigError::Validation`] carrying this message.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
