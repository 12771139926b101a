//! Structured logging for the Cerberus authorization gate.
//!
//! This crate wires the `tracing` ecosystem for Cerberus deployments:
//!
//! - **JSON logging** for production, pretty output for development
//! - **Standard field names** in [`logging::fields`], so every component
//!   logs consumers, endpoints, and cache outcomes the same way
//! - **Token hygiene**: bearer token values are never log fields
//!
//! # Example
//!
//! ```rust,ignore
//! use cerberus_telemetry::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::production())?;
//! ```

#![doc(html_root_url = "https://docs.rs/cerberus-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
