//! Endpoint catalog: which paths belong to which policy family.
//!
//! Every guarded path is assigned to exactly one category; the policy engine
//! branches on the category, never on the raw path. The catalog ships with
//! the platform defaults and is overridable from configuration, with
//! pairwise disjointness enforced at load time.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Default endpoints answering catalogue-backed entity reads.
pub const DEFAULT_OPEN_ENDPOINTS: &[&str] = &[
    "/ngsi-ld/v1/entities",
    "/ngsi-ld/v1/temporal/entities",
    "/ngsi-ld/v1/entityOperations/query",
];

/// Default endpoints accepting adapter-mediated ingestion.
pub const DEFAULT_ADAPTER_ENDPOINTS: &[&str] = &["/themis/v1/adapter"];

/// Default endpoints managing subscriptions.
pub const DEFAULT_SUBSCRIPTION_ENDPOINTS: &[&str] = &["/ngsi-ld/v1/subscription"];

/// Default endpoints reserved for platform administration.
pub const DEFAULT_MANAGEMENT_ENDPOINTS: &[&str] = &[
    "/management/v1/queue",
    "/management/v1/exchange",
    "/management/v1/vhost",
    "/management/v1/bind",
    "/management/v1/unbind",
    "/management/v1/reset-password",
];

/// The policy family an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointCategory {
    /// Catalogue-backed reads, grantable to the public.
    Open,
    /// Adapter-mediated ingestion.
    Adapter,
    /// Subscription management.
    Subscription,
    /// Platform administration.
    Management,
}

impl EndpointCategory {
    /// Stable lowercase name, used in logs and error envelopes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Adapter => "adapter",
            Self::Subscription => "subscription",
            Self::Management => "management",
        }
    }
}

impl fmt::Display for EndpointCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The guarded paths of one deployment, partitioned by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointCatalog {
    /// Open endpoints.
    #[serde(default = "defaults::open")]
    pub open: BTreeSet<String>,
    /// Adapter endpoints.
    #[serde(default = "defaults::adapter")]
    pub adapter: BTreeSet<String>,
    /// Subscription endpoints.
    #[serde(default = "defaults::subscription")]
    pub subscription: BTreeSet<String>,
    /// Management endpoints.
    #[serde(default = "defaults::management")]
    pub management: BTreeSet<String>,
}

mod defaults {
    use super::{
        BTreeSet, DEFAULT_ADAPTER_ENDPOINTS, DEFAULT_MANAGEMENT_ENDPOINTS, DEFAULT_OPEN_ENDPOINTS,
        DEFAULT_SUBSCRIPTION_ENDPOINTS,
    };

    fn owned(entries: &[&str]) -> BTreeSet<String> {
        entries.iter().map(ToString::to_string).collect()
    }

    pub(super) fn open() -> BTreeSet<String> {
        owned(DEFAULT_OPEN_ENDPOINTS)
    }

    pub(super) fn adapter() -> BTreeSet<String> {
        owned(DEFAULT_ADAPTER_ENDPOINTS)
    }

    pub(super) fn subscription() -> BTreeSet<String> {
        owned(DEFAULT_SUBSCRIPTION_ENDPOINTS)
    }

    pub(super) fn management() -> BTreeSet<String> {
        owned(DEFAULT_MANAGEMENT_ENDPOINTS)
    }
}

impl Default for EndpointCatalog {
    fn default() -> Self {
        Self {
            open: defaults::open(),
            adapter: defaults::adapter(),
            subscription: defaults::subscription(),
            management: defaults::management(),
        }
    }
}

impl EndpointCatalog {
    /// Builds a catalog from explicit per-category path sets.
    #[must_use]
    pub fn new(
        open: impl IntoIterator<Item = String>,
        adapter: impl IntoIterator<Item = String>,
        subscription: impl IntoIterator<Item = String>,
        management: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            open: open.into_iter().collect(),
            adapter: adapter.into_iter().collect(),
            subscription: subscription.into_iter().collect(),
            management: management.into_iter().collect(),
        }
    }

    /// The category the endpoint belongs to, or `None` for unguarded paths.
    #[must_use]
    pub fn classify(&self, endpoint: &str) -> Option<EndpointCategory> {
        if self.open.contains(endpoint) {
            Some(EndpointCategory::Open)
        } else if self.adapter.contains(endpoint) {
            Some(EndpointCategory::Adapter)
        } else if self.subscription.contains(endpoint) {
            Some(EndpointCategory::Subscription)
        } else if self.management.contains(endpoint) {
            Some(EndpointCategory::Management)
        } else {
            None
        }
    }

    /// Returns `true` if the endpoint sits in the open category.
    #[must_use]
    pub fn is_open_endpoint(&self, endpoint: &str) -> bool {
        self.open.contains(endpoint)
    }

    /// The path set of one category.
    #[must_use]
    pub fn endpoints_of(&self, category: EndpointCategory) -> &BTreeSet<String> {
        match category {
            EndpointCategory::Open => &self.open,
            EndpointCategory::Adapter => &self.adapter,
            EndpointCategory::Subscription => &self.subscription,
            EndpointCategory::Management => &self.management,
        }
    }

    /// Checks that no path appears in more than one category.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Contract`] naming the first duplicated path.
    pub fn validate(&self) -> AuthResult<()> {
        let families = [
            (EndpointCategory::Open, &self.open),
            (EndpointCategory::Adapter, &self.adapter),
            (EndpointCategory::Subscription, &self.subscription),
            (EndpointCategory::Management, &self.management),
        ];
        for (i, (left_name, left)) in families.iter().enumerate() {
            for (right_name, right) in families.iter().skip(i + 1) {
                if let Some(path) = left.intersection(right).next() {
                    return Err(AuthError::contract(format!(
                        "endpoint `{path}` listed as both {left_name} and {right_name}"
                    )));
                }
            }
        }
        Ok(())
    }
}
