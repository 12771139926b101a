//! Token resolution: cache first, remote introspection on miss.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use cerberus_core::{AuthError, AuthResult, BearerToken, TipGrant};

use crate::cache::{CacheLookup, CacheStatsSnapshot, TokenCache};
use crate::client::TipClient;
use crate::config::IntrospectionConfig;

/// Resolves bearer tokens to grants through the cache and the remote
/// introspection provider.
pub struct TokenIntrospector {
    client: Arc<dyn TipClient>,
    cache: Arc<TokenCache>,
    cache_ttl: Duration,
}

impl TokenIntrospector {
    /// Creates an introspector over the given client, with an empty cache.
    #[must_use]
    pub fn new(client: Arc<dyn TipClient>, config: &IntrospectionConfig) -> Self {
        Self {
            client,
            cache: Arc::new(TokenCache::new()),
            cache_ttl: config.cache_ttl(),
        }
    }

    /// Shared handle to the underlying cache, for the background sweep.
    #[must_use]
    pub fn cache(&self) -> Arc<TokenCache> {
        self.cache.clone()
    }

    /// A point-in-time view of the cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    /// Resolves a token to its grant.
    ///
    /// The public sentinel resolves locally to the fixed public grant and
    /// never touches cache or provider. Other tokens are answered from the
    /// cache when fresh; on a miss the provider is asked and its answer
    /// overwrites whatever the cache holds for that token.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenInvalid`] for expired or rejected tokens,
    /// [`AuthError::Remote`] when the provider is unreachable, and
    /// [`AuthError::Contract`] when it answers garbage.
    #[tracing::instrument(skip(self, token))]
    pub async fn resolve(&self, token: &BearerToken) -> AuthResult<TipGrant> {
        if token.is_public() {
            return Ok(TipGrant::public_access());
        }

        let raw = token.expose();
        match self.cache.lookup(raw, Utc::now(), self.cache_ttl) {
            CacheLookup::Hit(grant) => {
                debug!(cache_outcome = "hit", "Resolved token from cache");
                Ok(grant)
            }
            CacheLookup::TokenExpired => {
                debug!(cache_outcome = "expired", "Cached token has expired");
                Err(AuthError::token_invalid("Token has expired"))
            }
            CacheLookup::Miss => {
                debug!(cache_outcome = "miss", "Introspecting token remotely");
                let grant = self.client.introspect(raw).await?;
                self.cache
                    .insert(raw, grant.clone(), Utc::now(), self.cache_ttl);
                Ok(grant)
            }
        }
    }
}

impl fmt::Debug for TokenIntrospector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIntrospector")
            .field("cached_grants", &self.cache.len())
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration as ChronoDuration;

    use cerberus_core::BoxFuture;

    struct FakeTip {
        grant: TipGrant,
        calls: AtomicUsize,
    }

    impl FakeTip {
        fn new(grant: TipGrant) -> Arc<Self> {
            Arc::new(Self {
                grant,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TipClient for FakeTip {
        fn introspect<'a>(&'a self, _token: &'a str) -> BoxFuture<'a, AuthResult<TipGrant>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let grant = self.grant.clone();
            Box::pin(async move { Ok(grant) })
        }
    }

    fn live_grant() -> TipGrant {
        TipGrant {
            consumer: "consumer@example.org".to_string(),
            public_consumer: None,
            provider: Some("provider.org/abc".to_string()),
            requests: vec![],
            token_expiry: Utc::now() + ChronoDuration::hours(1),
        }
    }

    #[tokio::test]
    async fn test_public_sentinel_resolves_locally() {
        let tip = FakeTip::new(live_grant());
        let introspector = TokenIntrospector::new(tip.clone(), &IntrospectionConfig::default());

        let grant = introspector
            .resolve(&BearerToken::public())
            .await
            .expect("public sentinel always resolves");

        assert_eq!(grant, TipGrant::public_access());
        assert_eq!(tip.calls(), 0);
        assert!(introspector.cache().is_empty());
    }

    #[tokio::test]
    async fn test_second_resolve_is_served_from_cache() {
        let tip = FakeTip::new(live_grant());
        let introspector = TokenIntrospector::new(tip.clone(), &IntrospectionConfig::default());
        let token = BearerToken::from("opaque-token");

        let first = introspector.resolve(&token).await.expect("introspects");
        let second = introspector.resolve(&token).await.expect("cached");

        assert_eq!(first, second);
        assert_eq!(tip.calls(), 1);
        assert_eq!(introspector.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_expired_cached_token_is_rejected_without_remote_call() {
        let tip = FakeTip::new(live_grant());
        let introspector = TokenIntrospector::new(tip.clone(), &IntrospectionConfig::default());
        let token = BearerToken::from("stale-token");

        let mut expired = live_grant();
        expired.token_expiry = Utc::now() - ChronoDuration::minutes(1);
        introspector.cache().insert(
            token.expose(),
            expired,
            Utc::now(),
            Duration::from_secs(600),
        );

        let err = introspector
            .resolve(&token)
            .await
            .expect_err("expired token is invalid");
        assert!(err.is_token_invalid());
        assert_eq!(tip.calls(), 0);
    }
}
