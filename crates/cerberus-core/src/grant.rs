//! Token-introspection grant model.
//!
//! A [`TipGrant`] is the validated result of introspecting a bearer token:
//! who the caller is (`consumer`), which resource-id patterns they may touch,
//! and which endpoints each pattern is granted for. The wire shape matches
//! the introspection provider's response body; cache bookkeeping (the local
//! cache expiry) lives with the cache entry, not here.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::endpoints::DEFAULT_OPEN_ENDPOINTS;
use crate::token::PUBLIC_TOKEN;

/// Api entry granting access to every endpoint.
pub const WILDCARD_API: &str = "/*";

/// Consumer identity attached to the fixed public grant.
pub const PUBLIC_CONSUMER: &str = "public.consumer@themis.example";

/// Resource-id pattern covered by the fixed public grant.
pub const PUBLIC_RESOURCE_PATTERN: &str = "themis.example/public/*";

/// One entry of a grant: a resource-id pattern and the endpoints it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    /// Resource-id pattern. `*` matches any run of characters; `/` and `.`
    /// match literally.
    pub id: String,
    /// Endpoint paths this entry grants, or [`WILDCARD_API`] for all.
    #[serde(default)]
    pub apis: Vec<String>,
}

impl GrantRequest {
    /// Creates an entry for one resource-id pattern.
    #[must_use]
    pub fn new(id: impl Into<String>, apis: Vec<String>) -> Self {
        Self {
            id: id.into(),
            apis,
        }
    }

    /// Returns `true` if this entry grants the exact endpoint (or carries
    /// the `"/*"` wildcard).
    #[must_use]
    pub fn grants_endpoint(&self, endpoint: &str) -> bool {
        self.apis
            .iter()
            .any(|api| api == WILDCARD_API || api == endpoint)
    }

    /// Returns `true` if this entry's id pattern covers the resource id.
    ///
    /// Exact equality short-circuits; otherwise the pattern is matched with
    /// `/` and `.` literal and `*` expanding to any run of characters, over
    /// the full id.
    #[must_use]
    pub fn matches_resource_id(&self, resource_id: &str) -> bool {
        if self.id == resource_id {
            return true;
        }
        let escaped = self.id.replace('.', "\\.").replace('*', ".*");
        Regex::new(&format!("^{escaped}$"))
            .is_ok_and(|pattern| pattern.is_match(resource_id))
    }
}

/// The validated result of token introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipGrant {
    /// The caller identity this token belongs to.
    pub consumer: String,
    /// The public consumer identity, reported alongside secure-resource
    /// denials for bookkeeping.
    #[serde(rename = "public-consumer", default, skip_serializing_if = "Option::is_none")]
    pub public_consumer: Option<String>,
    /// The provider identity behind the granted resources, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Granted resource-id patterns, in grant order.
    #[serde(rename = "request", default)]
    pub requests: Vec<GrantRequest>,
    /// Instant after which the token is invalid at the source of truth.
    #[serde(rename = "expiry")]
    pub token_expiry: DateTime<Utc>,
}

impl TipGrant {
    /// The fixed grant answered for the public sentinel token.
    ///
    /// Never cached and never fetched: the sentinel is resolved locally. The
    /// single request entry covers the public resource prefix for the open
    /// endpoints only, so the grant passes no other category's entitlement
    /// check.
    #[must_use]
    pub fn public_access() -> Self {
        Self {
            consumer: PUBLIC_CONSUMER.to_string(),
            public_consumer: Some(PUBLIC_CONSUMER.to_string()),
            provider: None,
            requests: vec![GrantRequest::new(
                PUBLIC_RESOURCE_PATTERN,
                DEFAULT_OPEN_ENDPOINTS.iter().map(ToString::to_string).collect(),
            )],
            token_expiry: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// The first (lead) request entry, which drives most policy branches.
    #[must_use]
    pub fn lead_request(&self) -> Option<&GrantRequest> {
        self.requests.first()
    }

    /// The first request entry whose pattern covers the resource id.
    #[must_use]
    pub fn matching_request(&self, resource_id: &str) -> Option<&GrantRequest> {
        self.requests
            .iter()
            .find(|request| request.matches_resource_id(resource_id))
    }

    /// Returns `true` once the token itself has expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.token_expiry
    }
}

/// Returns `true` if the raw token value is the public sentinel.
///
/// Convenience mirror of [`crate::BearerToken::is_public`] for call sites
/// holding a plain string.
#[must_use]
pub fn is_public_token(token: &str) -> bool {
    token.eq_ignore_ascii_case(PUBLIC_TOKEN)
}
