//! # Cerberus Config
//!
//! Typed configuration for the Cerberus authorization gate.
//!
//! This crate composes the per-subsystem configuration types into one
//! [`CerberusConfig`] document and loads it in layers:
//!
//! - [`CerberusConfig`] - Root schema with `production`/`permissive` presets
//! - [`ConfigLoader`] - Defaults, then TOML/JSON file, then environment
//!
//! Loading fails on unknown fields and on values the gate cannot run with
//! (empty remote URLs, zero timeouts, overlapping endpoint categories).
//!
//! # Example
//!
//! ```no_run
//! use cerberus_config::ConfigLoader;
//!
//! # fn main() -> Result<(), cerberus_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("cerberus.toml")?
//!     .with_env_prefix("CERBERUS")
//!     .load()?;
//!
//! println!("introspecting against {}", config.tip.endpoint_url());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! mode = "production"
//!
//! [tip]
//! base_url = "https://tip.themis.example"
//! cache_ttl_secs = 1800
//!
//! [catalogue]
//! base_url = "https://catalogue.themis.example"
//!
//! [policy]
//! admin_identity = "themis.example/4dca9b2c51f173a06d2fc6c9e23eb02d83f17b0d"
//!
//! [logging]
//! level = "info"
//! json_format = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Scalar values can be overridden via environment variables using the
//! format `PREFIX__SECTION__KEY`. For example:
//!
//! - `CERBERUS__MODE=permissive`
//! - `CERBERUS__TIP__BASE_URL=http://tip.internal:9000`
//! - `CERBERUS__LOGGING__LEVEL=debug`

#![doc(html_root_url = "https://docs.rs/cerberus-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::CerberusConfig;
