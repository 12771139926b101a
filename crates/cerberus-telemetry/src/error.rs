//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::InvalidFilter("no such level".to_string());
        assert_eq!(err.to_string(), "Invalid log filter: no such level");

        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");
    }
}
