//! Catalogue client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default catalogue origin.
pub const DEFAULT_CATALOGUE_BASE_URL: &str = "https://catalogue.themis.example";

/// Default catalogue search path.
pub const DEFAULT_SEARCH_PATH: &str = "/catalogue/v1/search";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the catalogue search client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogueConfig {
    /// Origin of the catalogue service, scheme included.
    pub base_url: String,

    /// Path of the search endpoint.
    pub search_path: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOGUE_BASE_URL.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CatalogueConfig {
    /// Points the client at a different catalogue origin.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The full search URL.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.search_path)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
