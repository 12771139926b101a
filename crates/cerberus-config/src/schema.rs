//! Root configuration schema.
//!
//! [`CerberusConfig`] composes the per-subsystem configuration types into
//! one document, so a single TOML or JSON file configures the whole gate.

use serde::{Deserialize, Serialize};

use cerberus_catalogue::CatalogueConfig;
use cerberus_core::DeploymentMode;
use cerberus_policy::PolicyConfig;
use cerberus_telemetry::LogConfig;
use cerberus_tip::IntrospectionConfig;

use crate::ConfigError;

/// Complete configuration for the Cerberus authorization gate.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from
/// files and environment variables.
///
/// # Example
///
/// ```
/// use cerberus_config::CerberusConfig;
///
/// let config = CerberusConfig::default();
/// assert!(config.mode.is_production());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct CerberusConfig {
    /// Deployment mode: `production` or `permissive`.
    pub mode: DeploymentMode,

    /// Token introspection provider and grant cache settings.
    pub tip: IntrospectionConfig,

    /// Catalogue search client settings.
    pub catalogue: CatalogueConfig,

    /// Access policy settings: endpoint catalog and administrative identity.
    pub policy: PolicyConfig,

    /// Logging settings.
    pub logging: LogConfig,
}

impl CerberusConfig {
    /// Create a production configuration preset.
    ///
    /// Strict mode with JSON logging at info level.
    ///
    /// # Example
    ///
    /// ```
    /// use cerberus_config::CerberusConfig;
    ///
    /// let config = CerberusConfig::production();
    /// assert!(config.mode.is_production());
    /// assert!(config.logging.json_format);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        Self {
            mode: DeploymentMode::Production,
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// Create a permissive configuration preset.
    ///
    /// The public sentinel is granted test identities instead of being
    /// denied, and logging switches to the human-readable development
    /// format at debug level.
    ///
    /// # Example
    ///
    /// ```
    /// use cerberus_config::CerberusConfig;
    ///
    /// let config = CerberusConfig::permissive();
    /// assert!(!config.mode.is_production());
    /// assert!(!config.logging.json_format);
    /// ```
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            mode: DeploymentMode::Permissive,
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - A remote base URL is empty
    /// - A timeout, cache TTL, or sweep interval is zero
    /// - The administrative identity is empty
    /// - The endpoint categories overlap
    /// - The log filter directive is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tip.base_url.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "tip.base_url",
                "must not be empty",
            ));
        }
        if self.tip.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "tip.timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.tip.cache_ttl_secs == 0 {
            return Err(ConfigError::invalid_value(
                "tip.cache_ttl_secs",
                "must be greater than zero",
            ));
        }
        if self.tip.sweep_interval_secs == 0 {
            return Err(ConfigError::invalid_value(
                "tip.sweep_interval_secs",
                "must be greater than zero",
            ));
        }

        if self.catalogue.base_url.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "catalogue.base_url",
                "must not be empty",
            ));
        }
        if self.catalogue.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "catalogue.timeout_secs",
                "must be greater than zero",
            ));
        }

        self.policy
            .validate()
            .map_err(|e| ConfigError::validation_error(e.to_string()))?;

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }
}
