//! Policy engine configuration and fixed identities.

use serde::{Deserialize, Serialize};

use cerberus_core::{AuthError, AuthResult, EndpointCatalog};

/// Administrative provider identity management grants must carry.
pub const DEFAULT_ADMIN_IDENTITY: &str =
    "themis.example/4dca9b2c51f173a06d2fc6c9e23eb02d83f17b0d";

/// Fabricated consumer identity answered in permissive deployments.
///
/// Test fixture for the permissive profile; never a real platform identity.
pub const TEST_CONSUMER: &str = "test.consumer@themis.example";

/// Fabricated provider identity answered in permissive deployments.
///
/// Test fixture for the permissive profile; never a real platform identity.
pub const TEST_PROVIDER_SHA: &str =
    "themis.example/b2e41d7a9c03f8e6512a4b0c9d8e7f6a5b4c3d2e";

/// Configuration for the access policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Provider identity recognized as the platform administrator.
    pub admin_identity: String,

    /// Guarded paths partitioned into policy families.
    pub endpoints: EndpointCatalog,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            admin_identity: DEFAULT_ADMIN_IDENTITY.to_string(),
            endpoints: EndpointCatalog::default(),
        }
    }
}

impl PolicyConfig {
    /// Overrides the administrative identity.
    #[must_use]
    pub fn with_admin_identity(mut self, identity: impl Into<String>) -> Self {
        self.admin_identity = identity.into();
        self
    }

    /// Overrides the endpoint catalog.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointCatalog) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Checks that the configuration is usable: a non-empty administrative
    /// identity and pairwise-disjoint endpoint sets.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Contract`] naming the violation.
    pub fn validate(&self) -> AuthResult<()> {
        if self.admin_identity.trim().is_empty() {
            return Err(AuthError::contract("administrative identity must not be empty"));
        }
        self.endpoints.validate()
    }
}
