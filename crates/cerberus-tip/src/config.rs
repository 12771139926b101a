//! Introspection client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default introspection endpoint origin.
pub const DEFAULT_TIP_BASE_URL: &str = "https://tip.themis.example";

/// Default introspection endpoint path.
pub const DEFAULT_TIP_PATH: &str = "/tip/v1/token";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30 * 60;

/// Configuration for the token introspection client and its grant cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntrospectionConfig {
    /// Origin of the introspection provider, scheme included.
    pub base_url: String,

    /// Path of the introspection endpoint.
    pub path: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// How long a cached grant stays fresh, in seconds.
    pub cache_ttl_secs: u64,

    /// How often the background sweep runs, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TIP_BASE_URL.to_string(),
            path: DEFAULT_TIP_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl IntrospectionConfig {
    /// Points the client at a different introspection origin.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the cache freshness window.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// The full introspection URL.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.path
        )
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cache freshness window as a [`Duration`].
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Sweep period as a [`Duration`].
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
