//! Top-level authorization pipeline.
//!
//! [`Authorizer`] wires the three stages together: token introspection,
//! catalogue classification and the policy decision. Calls presenting the
//! `public` sentinel are settled locally; every other call runs
//! introspection and classification concurrently and hands both results to
//! the policy engine.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use cerberus_catalogue::{
    CatalogueClient, CatalogueConfig, Classifier, ClassifierStatsSnapshot, HttpCatalogueClient,
};
use cerberus_config::CerberusConfig;
use cerberus_core::{
    AuthContext, AuthError, AuthResult, Authorization, Classification, DenialReason,
    DeploymentMode, UserRequest,
};
use cerberus_policy::{PolicyConfig, PolicyEngine, TEST_CONSUMER, TEST_PROVIDER_SHA};
use cerberus_tip::{
    CacheStatsSnapshot, HttpTipClient, IntrospectionConfig, SweepTask, TipClient,
    TokenIntrospector,
};

/// Authorization gate for incoming API calls.
///
/// One instance serves the whole process: the introspector and classifier
/// caches behind it are shared across calls, and [`authorize`] takes
/// `&self`.
///
/// [`authorize`]: Authorizer::authorize
pub struct Authorizer {
    /// How the public sentinel is treated on guarded endpoints.
    mode: DeploymentMode,
    /// Token introspection stage with its grant cache.
    introspector: TokenIntrospector,
    /// Catalogue classification stage with its verdict cache.
    classifier: Classifier,
    /// Per-endpoint-family policy decisions.
    engine: PolicyEngine,
    /// Background eviction for the grant cache.
    sweeper: SweepTask,
}

impl Authorizer {
    /// Starts a builder with default component configuration.
    #[must_use]
    pub fn builder() -> AuthorizerBuilder {
        AuthorizerBuilder::default()
    }

    /// Builds an authorizer from a loaded configuration.
    pub fn from_config(config: &CerberusConfig) -> AuthResult<Self> {
        Self::builder()
            .mode(config.mode)
            .introspection(config.tip.clone())
            .catalogue(config.catalogue.clone())
            .policy(config.policy.clone())
            .build()
    }

    /// Authorizes one API call.
    ///
    /// The public sentinel never leaves the process: open endpoints get an
    /// anonymous authorization, non-open endpoints are denied in production
    /// and mapped to the fixed test identities in permissive deployments.
    /// Real tokens are introspected and classified concurrently; the first
    /// remote failure aborts the call. Classification only matters on open
    /// endpoints, so every other endpoint skips the catalogue.
    #[tracing::instrument(
        skip(self, ctx, request),
        fields(endpoint = %ctx.api_endpoint, http_method = %ctx.http_method)
    )]
    pub async fn authorize(
        &self,
        ctx: &AuthContext,
        request: &UserRequest,
    ) -> AuthResult<Authorization> {
        if ctx.token.is_public() {
            return self.authorize_public(ctx);
        }

        let classify = async {
            if self.engine.endpoints().is_open_endpoint(&ctx.api_endpoint) {
                self.classifier.classify(&request.resource_ids).await
            } else {
                Ok(Classification::Skipped)
            }
        };
        let (grant, classification) =
            tokio::try_join!(self.introspector.resolve(&ctx.token), classify)?;

        self.engine.decide(&grant, &classification, ctx, request)
    }

    /// Settles a public-sentinel call without touching the remote services.
    fn authorize_public(&self, ctx: &AuthContext) -> AuthResult<Authorization> {
        if self.engine.endpoints().is_open_endpoint(&ctx.api_endpoint) {
            debug!("public sentinel on open endpoint, anonymous access");
            return Ok(Authorization::anonymous());
        }

        if self.mode.is_production() {
            debug!("public sentinel rejected on guarded endpoint");
            return Err(AuthError::denied(DenialReason::PublicTokenRestricted));
        }

        debug!(consumer = TEST_CONSUMER, "public sentinel mapped to test identity");
        Ok(Authorization::for_consumer(TEST_CONSUMER).with_provider(TEST_PROVIDER_SHA))
    }

    /// The deployment mode this gate enforces.
    #[must_use]
    pub const fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// Starts the background sweep of the grant cache.
    pub fn start_sweeper(&self) {
        self.sweeper.start();
    }

    /// Stops the background sweep and waits for it to finish.
    pub async fn stop_sweeper(&self) {
        self.sweeper.stop().await;
    }

    /// Whether the background sweep is running.
    #[must_use]
    pub fn sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Counters of the token grant cache.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.introspector.cache_stats()
    }

    /// Counters of the catalogue classifier.
    #[must_use]
    pub fn classifier_stats(&self) -> ClassifierStatsSnapshot {
        self.classifier.stats()
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Builder assembling an [`Authorizer`] from per-component configuration.
///
/// Remote clients default to the HTTP implementations built from the given
/// configuration; tests inject in-memory doubles through
/// [`with_tip_client`] and [`with_catalogue_client`].
///
/// [`with_tip_client`]: AuthorizerBuilder::with_tip_client
/// [`with_catalogue_client`]: AuthorizerBuilder::with_catalogue_client
#[derive(Default)]
pub struct AuthorizerBuilder {
    mode: DeploymentMode,
    tip: IntrospectionConfig,
    catalogue: CatalogueConfig,
    policy: PolicyConfig,
    tip_client: Option<Arc<dyn TipClient>>,
    catalogue_client: Option<Arc<dyn CatalogueClient>>,
}

impl AuthorizerBuilder {
    /// Sets the deployment mode.
    #[must_use]
    pub fn mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the introspection client and grant cache configuration.
    #[must_use]
    pub fn introspection(mut self, config: IntrospectionConfig) -> Self {
        self.tip = config;
        self
    }

    /// Sets the catalogue client configuration.
    #[must_use]
    pub fn catalogue(mut self, config: CatalogueConfig) -> Self {
        self.catalogue = config;
        self
    }

    /// Sets the policy engine configuration.
    #[must_use]
    pub fn policy(mut self, config: PolicyConfig) -> Self {
        self.policy = config;
        self
    }

    /// Replaces the HTTP introspection client.
    #[must_use]
    pub fn with_tip_client(mut self, client: Arc<dyn TipClient>) -> Self {
        self.tip_client = Some(client);
        self
    }

    /// Replaces the HTTP catalogue client.
    #[must_use]
    pub fn with_catalogue_client(mut self, client: Arc<dyn CatalogueClient>) -> Self {
        self.catalogue_client = Some(client);
        self
    }

    /// Assembles the authorizer.
    ///
    /// Validates the policy configuration and constructs HTTP clients for
    /// any stage without an injected one. The background sweep is created
    /// but not started; call [`Authorizer::start_sweeper`] once the runtime
    /// is up.
    pub fn build(self) -> AuthResult<Authorizer> {
        self.policy.validate()?;

        let tip_client: Arc<dyn TipClient> = match self.tip_client {
            Some(client) => client,
            None => Arc::new(HttpTipClient::new(&self.tip)?),
        };
        let introspector = TokenIntrospector::new(tip_client, &self.tip);
        let sweeper = SweepTask::new(introspector.cache(), self.tip.sweep_interval());

        let catalogue_client: Arc<dyn CatalogueClient> = match self.catalogue_client {
            Some(client) => client,
            None => Arc::new(HttpCatalogueClient::new(&self.catalogue)?),
        };
        let classifier = Classifier::new(catalogue_client);

        Ok(Authorizer {
            mode: self.mode,
            introspector,
            classifier,
            engine: PolicyEngine::new(self.policy),
            sweeper,
        })
    }
}

impl fmt::Debug for AuthorizerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizerBuilder")
            .field("mode", &self.mode)
            .field("tip", &self.tip)
            .field("catalogue", &self.catalogue)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
