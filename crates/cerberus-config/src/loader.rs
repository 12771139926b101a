//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use cerberus_core::DeploymentMode;

use crate::{CerberusConfig, ConfigError};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// Scalar settings can be overridden through the environment; the endpoint
/// category sets are file-only.
///
/// # Example
///
/// ```no_run
/// use cerberus_config::ConfigLoader;
///
/// # fn main() -> Result<(), cerberus_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("cerberus.toml")?
///     .with_env_prefix("CERBERUS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CerberusConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CerberusConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = CerberusConfig::default();
        self
    }

    /// Start with the production preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use cerberus_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_production()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.mode.is_production());
    /// ```
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = CerberusConfig::production();
        self
    }

    /// Start with the permissive preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use cerberus_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_permissive()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!config.mode.is_production());
    /// ```
    #[must_use]
    pub fn with_permissive(mut self) -> Self {
        self.config = CerberusConfig::permissive();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats.
    /// The file format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields (strict mode)
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Arguments
    ///
    /// * `content` - Configuration content as a string
    /// * `format` - File format ("toml" or "json")
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use cerberus_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [tip]
    ///     base_url = "http://127.0.0.1:9000"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.tip.base_url, "http://127.0.0.1:9000");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "CERBERUS":
    /// - `CERBERUS__MODE=permissive`
    /// - `CERBERUS__TIP__BASE_URL=http://tip.internal:9000`
    /// - `CERBERUS__LOGGING__LEVEL=debug`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file for environment variables.
    ///
    /// Uses the `dotenvy` crate to load variables from a file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        // Load .env file, ignore if not found
        let _ = dotenvy::dotenv();
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Environment variable parsing fails
    /// - Configuration validation fails
    pub fn load(mut self) -> Result<CerberusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without validation.
    ///
    /// Use this if you want to inspect or modify the configuration
    /// before validation.
    #[must_use]
    pub fn load_unvalidated(self) -> CerberusConfig {
        self.config
    }

    // The file extension decides the parser.
    fn parse_file(content: &str, path: &Path) -> Result<CerberusConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        // PREFIX__SECTION__KEY, double underscore separated
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["MODE"] => {
                self.config.mode = match value.to_lowercase().as_str() {
                    "production" => DeploymentMode::Production,
                    "permissive" => DeploymentMode::Permissive,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'production' or 'permissive'",
                        ))
                    }
                };
            }

            // Introspection section
            ["TIP", "BASE_URL"] => {
                self.config.tip.base_url = value.to_string();
            }
            ["TIP", "PATH"] => {
                self.config.tip.path = value.to_string();
            }
            ["TIP", "TIMEOUT_SECS"] => {
                self.config.tip.timeout_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["TIP", "CACHE_TTL_SECS"] => {
                self.config.tip.cache_ttl_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["TIP", "SWEEP_INTERVAL_SECS"] => {
                self.config.tip.sweep_interval_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            // Catalogue section
            ["CATALOGUE", "BASE_URL"] => {
                self.config.catalogue.base_url = value.to_string();
            }
            ["CATALOGUE", "SEARCH_PATH"] => {
                self.config.catalogue.search_path = value.to_string();
            }
            ["CATALOGUE", "TIMEOUT_SECS"] => {
                self.config.catalogue.timeout_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            // Policy section
            ["POLICY", "ADMIN_IDENTITY"] => {
                self.config.policy.admin_identity = value.to_string();
            }

            // Logging section
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "JSON_FORMAT"] => {
                self.config.logging.json_format = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "SPAN_EVENTS"] => {
                self.config.logging.span_events = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "FILE_LINE_INFO"] => {
                self.config.logging.file_line_info = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "THREAD_IDS"] => {
                self.config.logging.thread_ids = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "INCLUDE_TARGET"] => {
                self.config.logging.include_target = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "SERVICE_NAME"] => {
                self.config.logging.service_name = value.to_string();
            }

            // Unrecognized keys under the prefix are ignored.
            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
