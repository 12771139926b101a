//! Request-side and response-side authorization types.
//!
//! [`AuthContext`] carries what the transport layer knows about the call,
//! [`UserRequest`] carries what the caller is asking for, and
//! [`Authorization`] is the identity pair handed back on success.

use http::Method;
use serde::{Deserialize, Serialize};

use crate::token::BearerToken;

/// Transport-level facts about one inbound call.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The presented bearer token.
    pub token: BearerToken,
    /// Endpoint path the call targets, e.g. `/ngsi-ld/v1/entities`.
    pub api_endpoint: String,
    /// HTTP method of the call.
    pub http_method: Method,
    /// Subscription or adapter id, for the endpoint families that carry one.
    pub subscription_or_adapter_id: Option<String>,
}

impl AuthContext {
    /// Creates a context for a call without a subscription or adapter id.
    #[must_use]
    pub fn new(token: BearerToken, api_endpoint: impl Into<String>, http_method: Method) -> Self {
        Self {
            token,
            api_endpoint: api_endpoint.into(),
            http_method,
            subscription_or_adapter_id: None,
        }
    }

    /// Attaches the subscription or adapter id the call addresses.
    #[must_use]
    pub fn with_subscription_or_adapter_id(mut self, id: impl Into<String>) -> Self {
        self.subscription_or_adapter_id = Some(id.into());
        self
    }
}

/// What the caller is asking to read or write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRequest {
    /// Resource ids named by the call, lead id first.
    pub resource_ids: Vec<String>,
    /// Entity ids named by the call body, when the endpoint carries them.
    pub entity_ids: Vec<String>,
    /// Catalogue group an ingestion call writes into.
    pub resource_group: Option<String>,
    /// Resource server an ingestion call writes through.
    pub resource_server: Option<String>,
}

impl UserRequest {
    /// Creates a request naming the given resource ids.
    #[must_use]
    pub fn for_resources(resource_ids: Vec<String>) -> Self {
        Self {
            resource_ids,
            ..Self::default()
        }
    }

    /// Attaches the entity ids named by the call body.
    #[must_use]
    pub fn with_entities(mut self, entity_ids: Vec<String>) -> Self {
        self.entity_ids = entity_ids;
        self
    }

    /// Attaches the ingestion target: resource server and catalogue group.
    #[must_use]
    pub fn with_ingestion_target(
        mut self,
        resource_server: impl Into<String>,
        resource_group: impl Into<String>,
    ) -> Self {
        self.resource_server = Some(resource_server.into());
        self.resource_group = Some(resource_group.into());
        self
    }

    /// The first resource id of the call, which drives most policy branches.
    #[must_use]
    pub fn lead_resource_id(&self) -> Option<&str> {
        self.resource_ids.first().map(String::as_str)
    }
}

/// The identity pair returned when a call is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// Consumer identity the call runs as, absent for anonymous access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer: Option<String>,
    /// Provider identity behind the touched resources, when resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl Authorization {
    /// An authorization with neither identity resolved.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authorization for the given consumer, with no provider resolved.
    #[must_use]
    pub fn for_consumer(consumer: impl Into<String>) -> Self {
        Self {
            consumer: Some(consumer.into()),
            provider: None,
        }
    }

    /// Attaches the resolved provider identity.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_builder() {
        let ctx = AuthContext::new(
            BearerToken::from("abc"),
            "/ngsi-ld/v1/subscription",
            Method::DELETE,
        )
        .with_subscription_or_adapter_id("urn:subscription:42");

        assert_eq!(ctx.api_endpoint, "/ngsi-ld/v1/subscription");
        assert_eq!(ctx.http_method, Method::DELETE);
        assert_eq!(
            ctx.subscription_or_adapter_id.as_deref(),
            Some("urn:subscription:42")
        );
    }

    #[test]
    fn test_user_request_lead_resource() {
        let request = UserRequest::for_resources(vec![
            "org/sha/server/grp/a".to_string(),
            "org/sha/server/grp/b".to_string(),
        ]);
        assert_eq!(request.lead_resource_id(), Some("org/sha/server/grp/a"));
        assert!(UserRequest::default().lead_resource_id().is_none());
    }

    #[test]
    fn test_authorization_serializes_without_absent_fields() {
        let anonymous = serde_json::to_value(Authorization::anonymous()).expect("serializable");
        assert_eq!(anonymous, serde_json::json!({}));

        let full = serde_json::to_value(
            Authorization::for_consumer("alice@example.org").with_provider("org/abc123"),
        )
        .expect("serializable");
        assert_eq!(
            full,
            serde_json::json!({ "consumer": "alice@example.org", "provider": "org/abc123" })
        );
    }
}
