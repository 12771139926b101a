//! Structured JSON logging for Cerberus.
//!
//! This module wires the tracing-subscriber ecosystem for the authorization
//! gate: JSON output for production deployments, a pretty human-readable
//! format for development.
//!
//! Bearer tokens never appear in log output. Call sites log the fields in
//! [`fields`] instead, and the token type's `Debug` impl redacts its value.
//!
//! # Example
//!
//! ```rust,ignore
//! use cerberus_telemetry::logging::{LogConfig, init_logging};
//!
//! let config = LogConfig::default();
//! init_logging(&config)?;
//!
//! tracing::info!(endpoint = "/ngsi-ld/v1/entities", consumer = "alice@example.org", "Access granted");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Log filter directive (e.g., "info", "cerberus=debug,reqwest=warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Emit span open/close events.
    pub span_events: bool,

    /// Include source file and line numbers.
    pub file_line_info: bool,

    /// Include thread ids.
    pub thread_ids: bool,

    /// Include the emitting module path.
    pub include_target: bool,

    /// Service name for log fields.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "cerberus".to_string(),
        }
    }
}

impl LogConfig {
    /// Pretty-printed output at debug level, for local runs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            service_name: "cerberus".to_string(),
        }
    }

    /// JSON output at info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "cerberus".to_string(),
        }
    }
}

/// Initializes the logging subsystem.
///
/// # Arguments
///
/// * `config` - Logging configuration
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for an unparsable level
/// directive and [`TelemetryError::LoggingInit`] if a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TelemetryError::InvalidFilter(e.to_string()))?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Standard log fields for Cerberus.
///
/// Use these field names for consistency across logs. The bearer token
/// itself is never a log field.
pub mod fields {
    /// Consumer identity field name.
    pub const CONSUMER: &str = "consumer";

    /// Provider identity field name.
    pub const PROVIDER: &str = "provider";

    /// Resource id field name.
    pub const RESOURCE_ID: &str = "resource_id";

    /// Guarded endpoint path field name.
    pub const ENDPOINT: &str = "endpoint";

    /// Endpoint category field name.
    pub const CATEGORY: &str = "category";

    /// HTTP method field name.
    pub const HTTP_METHOD: &str = "http.method";

    /// Cache outcome field name (hit, miss, expired).
    pub const CACHE_OUTCOME: &str = "cache_outcome";

    /// Remote service field name (tip, catalogue).
    pub const REMOTE_SERVICE: &str = "remote_service";

    /// Elapsed time field name, in milliseconds.
    pub const DURATION_MS: &str = "duration_ms";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Service name field name.
    pub const SERVICE_NAME: &str = "service.name";
}
