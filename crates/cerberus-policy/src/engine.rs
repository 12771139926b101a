//! Category-dispatched access policy evaluation.
//!
//! `decide` is a pure function of its inputs: the resolved grant, the
//! catalogue classification, and the call being made. It never performs
//! I/O. Dispatch is strict on the endpoint category; a path outside every
//! category is denied explicitly rather than falling through.

use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::debug;

use cerberus_core::{
    resource, AuthContext, AuthError, AuthResult, Authorization, Classification, DenialReason,
    EndpointCatalog, EndpointCategory, TipGrant, UserRequest, WILDCARD_API,
};

use crate::config::PolicyConfig;
use crate::hasher::{IdentityHasher, Sha1IdentityHasher};

/// Decides whether a resolved grant covers a concrete call.
pub struct PolicyEngine {
    endpoints: EndpointCatalog,
    admin_identity: String,
    hasher: Arc<dyn IdentityHasher>,
}

impl PolicyEngine {
    /// Creates an engine with the default SHA-1 identity hasher.
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self::with_hasher(config, Arc::new(Sha1IdentityHasher))
    }

    /// Creates an engine with a custom identity hasher.
    #[must_use]
    pub fn with_hasher(config: PolicyConfig, hasher: Arc<dyn IdentityHasher>) -> Self {
        Self {
            endpoints: config.endpoints,
            admin_identity: config.admin_identity,
            hasher,
        }
    }

    /// The endpoint catalog this engine dispatches on.
    #[must_use]
    pub fn endpoints(&self) -> &EndpointCatalog {
        &self.endpoints
    }

    /// Evaluates one call against the grant backing its token.
    ///
    /// # Errors
    ///
    /// [`AuthError::Denied`] with a structured reason for well-formed but
    /// unauthorized calls, [`AuthError::NotFound`] when the open branch
    /// meets an unclassified resource, and [`AuthError::Contract`] when the
    /// grant or request is missing a field the branch requires.
    pub fn decide(
        &self,
        grant: &TipGrant,
        classification: &Classification,
        ctx: &AuthContext,
        request: &UserRequest,
    ) -> AuthResult<Authorization> {
        let Some(category) = self.endpoints.classify(&ctx.api_endpoint) else {
            debug!(endpoint = %ctx.api_endpoint, "Endpoint not in any category");
            return Err(AuthError::denied(DenialReason::UnknownEndpoint));
        };
        debug!(
            endpoint = %ctx.api_endpoint,
            category = %category,
            http_method = %ctx.http_method,
            "Evaluating access policy"
        );

        match category {
            EndpointCategory::Open => self.decide_open(grant, classification, request),
            EndpointCategory::Adapter => self.decide_adapter(grant, ctx, request),
            EndpointCategory::Subscription => self.decide_subscription(grant, ctx, request),
            EndpointCategory::Management => self.decide_management(grant),
        }
    }

    /// Open endpoints: open resources pass on classification alone; secure
    /// resources require the caller's grant to sit in the same catalogue
    /// group as the requested resource.
    fn decide_open(
        &self,
        grant: &TipGrant,
        classification: &Classification,
        request: &UserRequest,
    ) -> AuthResult<Authorization> {
        let allowed_id = lead_request_id(grant)?;
        let requested_id = request
            .lead_resource_id()
            .ok_or_else(|| AuthError::contract("request names no resource ids"))?;

        match classification.is_open(requested_id) {
            None => Err(AuthError::not_found(format!(
                "resource {requested_id} was not classified"
            ))),
            Some(true) => Ok(Authorization::for_consumer(grant.consumer.clone())),
            Some(false) => {
                let allowed_group = resource::parent(allowed_id).ok_or_else(|| {
                    AuthError::contract("grant resource-id has no enclosing group")
                })?;
                let requested_group = resource::parent(requested_id).ok_or_else(|| {
                    AuthError::contract("requested resource-id has no enclosing group")
                })?;
                if requested_group.eq_ignore_ascii_case(allowed_group) {
                    Ok(Authorization::for_consumer(grant.consumer.clone()))
                } else {
                    Err(AuthError::denied(DenialReason::GroupMismatch {
                        consumer: grant.public_consumer.clone(),
                    }))
                }
            }
        }
    }

    /// Adapter endpoints: POST ingestion must target a server/group pair
    /// inside the granted resource-id; other methods must address an
    /// adapter derived from it.
    fn decide_adapter(
        &self,
        grant: &TipGrant,
        ctx: &AuthContext,
        request: &UserRequest,
    ) -> AuthResult<Authorization> {
        if !self.entitled(grant, EndpointCategory::Adapter)? {
            return Err(AuthError::denied(DenialReason::EndpointNotGranted));
        }
        let granted_id = lead_request_id(grant)?;
        let provider_sha = resource::provider_prefix(granted_id)
            .ok_or_else(|| AuthError::contract("grant resource-id carries no provider prefix"))?;

        if ctx.http_method == Method::POST {
            let server = request
                .resource_server
                .as_deref()
                .ok_or_else(|| AuthError::contract("ingestion request missing resource server"))?;
            let group = request
                .resource_group
                .as_deref()
                .ok_or_else(|| AuthError::contract("ingestion request missing resource group"))?;
            let target = format!("{server}/{group}");
            if granted_id.contains(&target) {
                Ok(Authorization::for_consumer(grant.consumer.clone()).with_provider(provider_sha))
            } else {
                Err(AuthError::denied(DenialReason::AdapterMismatch))
            }
        } else {
            let adapter_id = resource::parent(granted_id)
                .ok_or_else(|| AuthError::contract("grant resource-id has no adapter prefix"))?;
            let presented = ctx
                .subscription_or_adapter_id
                .as_deref()
                .ok_or_else(|| AuthError::contract("request missing adapter id"))?;
            if presented.contains(adapter_id) {
                Ok(grant_scoped(grant))
            } else {
                Err(AuthError::denied(DenialReason::AdapterMismatch))
            }
        }
    }

    /// Subscription endpoints: creation is scoped by entity, updates by
    /// ownership and entity, everything else by ownership alone.
    fn decide_subscription(
        &self,
        grant: &TipGrant,
        ctx: &AuthContext,
        request: &UserRequest,
    ) -> AuthResult<Authorization> {
        if !self.entitled(grant, EndpointCategory::Subscription)? {
            return Err(AuthError::denied(DenialReason::EndpointNotGranted));
        }
        let granted_id = lead_request_id(grant)?;

        if ctx.http_method == Method::POST {
            self.require_entity_scope(granted_id, request)?;
            Ok(grant_scoped(grant))
        } else if ctx.http_method == Method::PUT || ctx.http_method == Method::PATCH {
            self.require_ownership(grant, ctx)?;
            self.require_entity_scope(granted_id, request)?;
            Ok(grant_scoped(grant))
        } else {
            self.require_ownership(grant, ctx)?;
            Ok(grant_scoped(grant))
        }
    }

    /// Management endpoints: reserved for the administrative provider
    /// identity, and still subject to the entitlement check.
    fn decide_management(&self, grant: &TipGrant) -> AuthResult<Authorization> {
        let granted_id = lead_request_id(grant)?;
        let provider_sha = resource::provider_prefix(granted_id)
            .ok_or_else(|| AuthError::contract("grant resource-id carries no provider prefix"))?;

        if !provider_sha.eq_ignore_ascii_case(&self.admin_identity) {
            return Err(AuthError::denied(DenialReason::NotAdmin));
        }
        if !self.entitled(grant, EndpointCategory::Management)? {
            return Err(AuthError::denied(DenialReason::EndpointNotGranted));
        }
        Ok(grant_scoped(grant))
    }

    /// The shared entitlement primitive: the grant's lead request entry
    /// must list an api belonging to the category's configured set, or the
    /// wildcard.
    fn entitled(&self, grant: &TipGrant, category: EndpointCategory) -> AuthResult<bool> {
        let lead = grant
            .lead_request()
            .ok_or_else(|| AuthError::contract("grant has no request entries"))?;
        let set = self.endpoints.endpoints_of(category);
        Ok(lead
            .apis
            .iter()
            .any(|api| api == WILDCARD_API || set.contains(api)))
    }

    /// The presented subscription id must embed the hash of the grant's
    /// consumer identity.
    fn require_ownership(&self, grant: &TipGrant, ctx: &AuthContext) -> AuthResult<()> {
        let presented = ctx
            .subscription_or_adapter_id
            .as_deref()
            .ok_or_else(|| AuthError::contract("request missing subscription id"))?;
        let owner_hash = self.hasher.hash(&grant.consumer);
        if presented.contains(&owner_hash) {
            Ok(())
        } else {
            Err(AuthError::denied(DenialReason::OwnerMismatch))
        }
    }

    /// The granted resource-id must contain the requested entity's
    /// enclosing scope.
    fn require_entity_scope(&self, granted_id: &str, request: &UserRequest) -> AuthResult<()> {
        let entity = request
            .entity_ids
            .first()
            .ok_or_else(|| AuthError::contract("subscription request names no entities"))?;
        let scope = resource::parent(entity)
            .ok_or_else(|| AuthError::contract("entity id has no enclosing scope"))?;
        if granted_id.contains(scope) {
            Ok(())
        } else {
            Err(AuthError::denied(DenialReason::EntityMismatch))
        }
    }
}

impl fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyEngine")
            .field("admin_identity", &self.admin_identity)
            .finish_non_exhaustive()
    }
}

fn lead_request_id(grant: &TipGrant) -> AuthResult<&str> {
    grant
        .lead_request()
        .map(|lead| lead.id.as_str())
        .ok_or_else(|| AuthError::contract("grant has no request entries"))
}

/// Success payload carrying the grant's own provider identity.
fn grant_scoped(grant: &TipGrant) -> Authorization {
    Authorization {
        consumer: Some(grant.consumer.clone()),
        provider: grant.provider.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::{Duration, Utc};

    use cerberus_core::{BearerToken, GrantRequest};

    const CONSUMER: &str = "alice@example.org";
    const PUBLIC_CONSUMER: &str = "public.consumer@themis.example";
    const GRANTED_ID: &str = "acme.example/9f8e7d/rs.acme.example/sensors/livestream";
    const GRANTED_GROUP_SIBLING: &str = "acme.example/9f8e7d/rs.acme.example/sensors/archive";
    const OTHER_GROUP_ID: &str = "acme.example/9f8e7d/rs.acme.example/vehicles/fleet";

    fn engine() -> PolicyEngine {
        PolicyEngine::new(PolicyConfig::default())
    }

    fn grant_with_apis(apis: &[&str]) -> TipGrant {
        TipGrant {
            consumer: CONSUMER.to_string(),
            public_consumer: Some(PUBLIC_CONSUMER.to_string()),
            provider: Some("acme.example/9f8e7d".to_string()),
            requests: vec![GrantRequest::new(
                GRANTED_ID,
                apis.iter().map(ToString::to_string).collect(),
            )],
            token_expiry: Utc::now() + Duration::hours(1),
        }
    }

    fn open_grant() -> TipGrant {
        grant_with_apis(&["/ngsi-ld/v1/entities"])
    }

    fn ctx(endpoint: &str, method: Method) -> AuthContext {
        AuthContext::new(BearerToken::from("token"), endpoint, method)
    }

    fn classified(entries: &[(&str, bool)]) -> Classification {
        Classification::resolved(
            entries
                .iter()
                .map(|(id, open)| ((*id).to_string(), *open))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn request_for(id: &str) -> UserRequest {
        UserRequest::for_resources(vec![id.to_string()])
    }

    #[test]
    fn test_unknown_endpoint_is_denied_explicitly() {
        let err = engine()
            .decide(
                &open_grant(),
                &Classification::Skipped,
                &ctx("/entities", Method::GET),
                &UserRequest::default(),
            )
            .expect_err("no category");
        assert_eq!(err.denial_reason(), Some(&DenialReason::UnknownEndpoint));
    }

    #[test]
    fn test_open_resource_passes_on_classification() {
        let auth = engine()
            .decide(
                &open_grant(),
                &classified(&[(OTHER_GROUP_ID, true)]),
                &ctx("/ngsi-ld/v1/entities", Method::GET),
                &request_for(OTHER_GROUP_ID),
            )
            .expect("open resource needs no group match");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));
        assert!(auth.provider.is_none());
    }

    #[test]
    fn test_secure_resource_same_group_succeeds() {
        let auth = engine()
            .decide(
                &open_grant(),
                &classified(&[(GRANTED_GROUP_SIBLING, false)]),
                &ctx("/ngsi-ld/v1/entities", Method::GET),
                &request_for(GRANTED_GROUP_SIBLING),
            )
            .expect("same catalogue group");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));
    }

    #[test]
    fn test_secure_resource_group_compare_ignores_case() {
        let requested = "ACME.example/9f8e7d/rs.acme.example/SENSORS/archive";
        let auth = engine()
            .decide(
                &open_grant(),
                &classified(&[(requested, false)]),
                &ctx("/ngsi-ld/v1/entities", Method::GET),
                &request_for(requested),
            )
            .expect("group compare is case-insensitive");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));
    }

    #[test]
    fn test_secure_resource_other_group_denied_with_public_consumer() {
        let err = engine()
            .decide(
                &open_grant(),
                &classified(&[(OTHER_GROUP_ID, false)]),
                &ctx("/ngsi-ld/v1/entities", Method::GET),
                &request_for(OTHER_GROUP_ID),
            )
            .expect_err("different catalogue group");
        assert_eq!(
            err.denial_reason(),
            Some(&DenialReason::GroupMismatch {
                consumer: Some(PUBLIC_CONSUMER.to_string())
            })
        );
    }

    #[test]
    fn test_unclassified_resource_is_not_found() {
        let err = engine()
            .decide(
                &open_grant(),
                &Classification::Skipped,
                &ctx("/ngsi-ld/v1/entities", Method::GET),
                &request_for(GRANTED_ID),
            )
            .expect_err("nothing classified");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_grant_without_requests_is_contract_violation() {
        let mut grant = open_grant();
        grant.requests.clear();
        let err = engine()
            .decide(
                &grant,
                &classified(&[(GRANTED_ID, true)]),
                &ctx("/ngsi-ld/v1/entities", Method::GET),
                &request_for(GRANTED_ID),
            )
            .expect_err("grant is malformed");
        assert_eq!(err.error_code(), "CONTRACT_VIOLATION");
    }

    #[test]
    fn test_adapter_requires_entitlement() {
        let err = engine()
            .decide(
                &open_grant(),
                &Classification::Skipped,
                &ctx("/themis/v1/adapter", Method::POST),
                &UserRequest::default(),
            )
            .expect_err("entities api does not grant adapter access");
        assert_eq!(err.denial_reason(), Some(&DenialReason::EndpointNotGranted));
    }

    #[test]
    fn test_adapter_post_targets_granted_server_group() {
        let grant = grant_with_apis(&["/themis/v1/adapter"]);
        let request = UserRequest::default().with_ingestion_target("rs.acme.example", "sensors");

        let auth = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/themis/v1/adapter", Method::POST),
                &request,
            )
            .expect("server/group pair sits inside the granted id");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));
        assert_eq!(auth.provider.as_deref(), Some("acme.example/9f8e7d"));
    }

    #[test]
    fn test_adapter_post_rejects_foreign_target() {
        let grant = grant_with_apis(&["/themis/v1/adapter"]);
        let request = UserRequest::default().with_ingestion_target("rs.other.example", "sensors");

        let err = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/themis/v1/adapter", Method::POST),
                &request,
            )
            .expect_err("target outside the granted id");
        assert_eq!(err.denial_reason(), Some(&DenialReason::AdapterMismatch));
    }

    #[test]
    fn test_adapter_delete_addresses_derived_adapter() {
        let grant = grant_with_apis(&["/themis/v1/adapter"]);
        let adapter_id = "acme.example/9f8e7d/rs.acme.example/sensors";
        let auth = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/themis/v1/adapter", Method::DELETE)
                    .with_subscription_or_adapter_id(adapter_id),
                &UserRequest::default(),
            )
            .expect("adapter id derives from the granted id");
        assert_eq!(auth.provider.as_deref(), Some("acme.example/9f8e7d"));
    }

    #[test]
    fn test_adapter_delete_rejects_foreign_adapter() {
        let grant = grant_with_apis(&["/themis/v1/adapter"]);
        let err = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/themis/v1/adapter", Method::DELETE)
                    .with_subscription_or_adapter_id("other.example/123/rs.other.example/grp"),
                &UserRequest::default(),
            )
            .expect_err("adapter belongs to someone else");
        assert_eq!(err.denial_reason(), Some(&DenialReason::AdapterMismatch));
    }

    #[test]
    fn test_subscription_post_scoped_by_entity() {
        let grant = grant_with_apis(&["/ngsi-ld/v1/subscription"]);
        let request = UserRequest::default().with_entities(vec![format!("{GRANTED_ID}/feed")]);

        let auth = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/ngsi-ld/v1/subscription", Method::POST),
                &request,
            )
            .expect("entity scope sits inside the granted id");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));
    }

    #[test]
    fn test_subscription_post_rejects_foreign_entity() {
        let grant = grant_with_apis(&["/ngsi-ld/v1/subscription"]);
        let request =
            UserRequest::default().with_entities(vec!["other.example/1/rs/grp/item".to_string()]);

        let err = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/ngsi-ld/v1/subscription", Method::POST),
                &request,
            )
            .expect_err("entity outside the granted id");
        assert_eq!(err.denial_reason(), Some(&DenialReason::EntityMismatch));
    }

    #[test]
    fn test_subscription_delete_checks_ownership() {
        let grant = grant_with_apis(&["/ngsi-ld/v1/subscription"]);
        let owner_hash = Sha1IdentityHasher.hash(CONSUMER);
        let subscription_id = format!("urn:subscription:{owner_hash}:42");

        let auth = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/ngsi-ld/v1/subscription", Method::DELETE)
                    .with_subscription_or_adapter_id(subscription_id),
                &UserRequest::default(),
            )
            .expect("caller owns the subscription");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));
    }

    #[test]
    fn test_subscription_delete_rejects_other_owner() {
        let grant = grant_with_apis(&["/ngsi-ld/v1/subscription"]);
        let err = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/ngsi-ld/v1/subscription", Method::DELETE)
                    .with_subscription_or_adapter_id("urn:subscription:deadbeef:42"),
                &UserRequest::default(),
            )
            .expect_err("someone else's subscription");
        assert_eq!(err.denial_reason(), Some(&DenialReason::OwnerMismatch));
    }

    #[test]
    fn test_subscription_put_requires_ownership_and_entity() {
        let grant = grant_with_apis(&["/ngsi-ld/v1/subscription"]);
        let owner_hash = Sha1IdentityHasher.hash(CONSUMER);
        let request = UserRequest::default().with_entities(vec![format!("{GRANTED_ID}/feed")]);

        let auth = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/ngsi-ld/v1/subscription", Method::PUT)
                    .with_subscription_or_adapter_id(format!("urn:subscription:{owner_hash}:7")),
                &request,
            )
            .expect("both ownership and entity scope hold");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));

        // Ownership alone is not enough for updates.
        let foreign_entity =
            UserRequest::default().with_entities(vec!["other.example/1/rs/grp/item".to_string()]);
        let err = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/ngsi-ld/v1/subscription", Method::PUT)
                    .with_subscription_or_adapter_id(format!("urn:subscription:{owner_hash}:7")),
                &foreign_entity,
            )
            .expect_err("entity scope fails");
        assert_eq!(err.denial_reason(), Some(&DenialReason::EntityMismatch));
    }

    #[test]
    fn test_subscription_missing_id_is_contract_violation() {
        let grant = grant_with_apis(&["/ngsi-ld/v1/subscription"]);
        let err = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/ngsi-ld/v1/subscription", Method::DELETE),
                &UserRequest::default(),
            )
            .expect_err("no subscription id presented");
        assert_eq!(err.error_code(), "CONTRACT_VIOLATION");
    }

    fn admin_grant(apis: &[&str]) -> TipGrant {
        let mut grant = grant_with_apis(apis);
        grant.requests = vec![GrantRequest::new(
            format!("{}/rs.themis.example/ops/board", crate::config::DEFAULT_ADMIN_IDENTITY),
            apis.iter().map(ToString::to_string).collect(),
        )];
        grant
    }

    #[test]
    fn test_management_requires_admin_and_entitlement() {
        let auth = engine()
            .decide(
                &admin_grant(&["/management/v1/queue"]),
                &Classification::Skipped,
                &ctx("/management/v1/queue", Method::POST),
                &UserRequest::default(),
            )
            .expect("admin with management api");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));

        // Same grant shape, non-admin provider prefix.
        let err = engine()
            .decide(
                &grant_with_apis(&["/management/v1/queue"]),
                &Classification::Skipped,
                &ctx("/management/v1/queue", Method::POST),
                &UserRequest::default(),
            )
            .expect_err("not the administrative identity");
        assert_eq!(err.denial_reason(), Some(&DenialReason::NotAdmin));

        // Admin identity but no management api in the grant.
        let err = engine()
            .decide(
                &admin_grant(&["/ngsi-ld/v1/entities"]),
                &Classification::Skipped,
                &ctx("/management/v1/queue", Method::POST),
                &UserRequest::default(),
            )
            .expect_err("admin without the management api");
        assert_eq!(err.denial_reason(), Some(&DenialReason::EndpointNotGranted));
    }

    #[test]
    fn test_admin_identity_compare_ignores_case() {
        let mut grant = admin_grant(&["/management/v1/queue"]);
        grant.requests[0].id = grant.requests[0].id.to_uppercase();
        // Uppercasing breaks only the identity compare if it were case
        // sensitive; the entitlement apis are untouched.
        let auth = engine()
            .decide(
                &grant,
                &Classification::Skipped,
                &ctx("/management/v1/queue", Method::POST),
                &UserRequest::default(),
            )
            .expect("identity compare is case-insensitive");
        assert_eq!(auth.consumer.as_deref(), Some(CONSUMER));
    }

    #[test]
    fn test_wildcard_api_entitles_every_category() {
        let engine = engine();
        let grant = grant_with_apis(&[WILDCARD_API]);
        for category in [
            EndpointCategory::Open,
            EndpointCategory::Adapter,
            EndpointCategory::Subscription,
            EndpointCategory::Management,
        ] {
            assert!(engine.entitled(&grant, category).expect("lead entry present"));
        }
    }
}
