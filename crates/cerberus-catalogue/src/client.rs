//! HTTP client for the catalogue search API.
//!
//! Classification asks the catalogue two kinds of question: does a resource
//! id exist at all, and which access policy its catalogue group carries.
//! Any failure on this path, transport included, answers "the resource
//! could not be resolved", so callers see [`cerberus_core::AuthError::NotFound`]
//! rather than a remote-failure status.

use serde_json::Value;
use tracing::debug;

use cerberus_core::{AuthError, AuthResult, BoxFuture};

use crate::config::CatalogueConfig;

/// Access policy label the catalogue marks open groups with.
const OPEN_LABEL: &str = "OPEN";

/// Access policy of a catalogue group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Resources in the group are publicly readable.
    Open,
    /// Resources in the group require a grant.
    Secure,
}

impl AccessPolicy {
    /// Maps the catalogue's policy label; anything other than `OPEN` is
    /// treated as secure.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label == OPEN_LABEL {
            Self::Open
        } else {
            Self::Secure
        }
    }

    /// Returns `true` for [`AccessPolicy::Open`].
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Catalogue search interface used by classification.
pub trait CatalogueClient: Send + Sync {
    /// Whether any catalogue item carries this resource id.
    fn resource_exists<'a>(&'a self, resource_id: &'a str) -> BoxFuture<'a, AuthResult<bool>>;

    /// The access policy of the catalogue group with this id.
    fn group_access_policy<'a>(
        &'a self,
        group_id: &'a str,
    ) -> BoxFuture<'a, AuthResult<AccessPolicy>>;
}

/// Reqwest-based client for the catalogue search API.
#[derive(Debug, Clone)]
pub struct HttpCatalogueClient {
    http: reqwest::Client,
    search_url: String,
}

impl HttpCatalogueClient {
    /// Builds a client for the configured catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] if the underlying HTTP client cannot
    /// be constructed, consistent with every other failure on this path.
    pub fn new(config: &CatalogueConfig) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AuthError::not_found(format!("failed to build catalogue client: {e}")))?;
        Ok(Self {
            http,
            search_url: config.search_url(),
        })
    }

    async fn search(&self, filter: &str, value: String) -> AuthResult<Value> {
        let response = self
            .http
            .get(&self.search_url)
            .query(&[
                ("filter", filter),
                ("property", "[id]"),
                ("value", value.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::not_found(format!("catalogue unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::not_found(format!(
                "catalogue search failed with status {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::not_found(format!("catalogue answered malformed JSON: {e}")))
    }

    async fn count_hits(&self, resource_id: &str) -> AuthResult<bool> {
        debug!(resource_id, remote_service = "catalogue", "Checking resource existence");
        let body = self.search("[id]", format!("[[{resource_id}]]")).await?;
        let hits = body
            .get("totalHits")
            .and_then(Value::as_u64)
            .ok_or_else(|| AuthError::not_found("catalogue response missing totalHits"))?;
        Ok(hits > 0)
    }

    async fn fetch_group_policy(&self, group_id: &str) -> AuthResult<AccessPolicy> {
        debug!(group_id, remote_service = "catalogue", "Fetching group access policy");
        let body = self
            .search("[accessPolicy]", format!("[[{group_id}]]"))
            .await?;
        let label = body
            .pointer("/results/0/accessPolicy")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AuthError::not_found(format!("catalogue group {group_id} has no access policy"))
            })?;
        Ok(AccessPolicy::from_label(label))
    }
}

impl CatalogueClient for HttpCatalogueClient {
    fn resource_exists<'a>(&'a self, resource_id: &'a str) -> BoxFuture<'a, AuthResult<bool>> {
        Box::pin(self.count_hits(resource_id))
    }

    fn group_access_policy<'a>(
        &'a self,
        group_id: &'a str,
    ) -> BoxFuture<'a, AuthResult<AccessPolicy>> {
        Box::pin(self.fetch_group_policy(group_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(AccessPolicy::from_label("OPEN"), AccessPolicy::Open);
        assert_eq!(AccessPolicy::from_label("SECURE"), AccessPolicy::Secure);
        assert_eq!(AccessPolicy::from_label("RESTRICTED"), AccessPolicy::Secure);
        // The label match is exact.
        assert_eq!(AccessPolicy::from_label("open"), AccessPolicy::Secure);
    }
}
