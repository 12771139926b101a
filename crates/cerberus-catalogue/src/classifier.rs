//! Two-stage open/secure classification of resource ids.
//!
//! Stage one confirms the id exists in the catalogue at all; stage two
//! resolves the access policy of its catalogue group (the first four
//! segments of the id). Ids are classified concurrently and the first
//! failure aborts the batch.
//!
//! Openness is cached per resource id, but only positively: a secure
//! verdict is re-checked on every classification so that a group opened
//! later is picked up. Group policies are recorded as they are fetched.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::try_join_all;
use tracing::debug;

use cerberus_core::{resource, AuthError, AuthResult, Classification};

use crate::client::{AccessPolicy, CatalogueClient};

/// Classifies resource ids as open or secure against the catalogue.
pub struct Classifier {
    client: Arc<dyn CatalogueClient>,
    open_resources: DashMap<String, AccessPolicy>,
    group_policies: DashMap<String, AccessPolicy>,
    stats: ClassifierStats,
}

impl Classifier {
    /// Creates a classifier over the given catalogue client, with empty
    /// caches.
    #[must_use]
    pub fn new(client: Arc<dyn CatalogueClient>) -> Self {
        Self {
            client,
            open_resources: DashMap::new(),
            group_policies: DashMap::new(),
            stats: ClassifierStats::default(),
        }
    }

    /// Classifies every id in the batch, failing fast on the first id that
    /// cannot be resolved.
    ///
    /// An empty batch skips the catalogue entirely. Ids too short to carry
    /// a catalogue group are left out of the resolved map, which downstream
    /// policy reads as "not open".
    ///
    /// # Errors
    ///
    /// [`AuthError::NotFound`] when an id does not exist in the catalogue
    /// or the catalogue cannot be reached.
    #[tracing::instrument(skip(self, resource_ids), fields(batch_size = resource_ids.len()))]
    pub async fn classify(&self, resource_ids: &[String]) -> AuthResult<Classification> {
        if resource_ids.is_empty() {
            return Ok(Classification::Skipped);
        }

        let entries =
            try_join_all(resource_ids.iter().map(|id| self.classify_one(id))).await?;

        let mut openness = HashMap::with_capacity(entries.len());
        for (id, open) in entries.into_iter().flatten() {
            openness.insert(id, open);
        }
        Ok(Classification::resolved(openness))
    }

    async fn classify_one(&self, resource_id: &str) -> AuthResult<Option<(String, bool)>> {
        let resolved = self.resolve_openness(resource_id).await;
        if resolved.is_err() {
            self.stats.record_failure();
        }
        resolved
    }

    async fn resolve_openness(&self, resource_id: &str) -> AuthResult<Option<(String, bool)>> {
        if let Some(policy) = self.open_resources.get(resource_id).map(|hit| *hit.value()) {
            self.stats.record_cache_hit();
            debug!(resource_id, cache_outcome = "hit", "Resource openness cached");
            return Ok(Some((resource_id.to_string(), policy.is_open())));
        }

        let Some(group) = resource::catalogue_group(resource_id) else {
            debug!(resource_id, "Resource id carries no catalogue group, skipping");
            return Ok(None);
        };

        self.stats.record_catalogue_lookup();
        if !self.client.resource_exists(resource_id).await? {
            return Err(AuthError::not_found(format!(
                "resource {resource_id} not found in catalogue"
            )));
        }

        let policy = self.client.group_access_policy(group).await?;
        self.group_policies.insert(group.to_string(), policy);
        if policy.is_open() {
            self.open_resources.insert(resource_id.to_string(), policy);
        }
        Ok(Some((resource_id.to_string(), policy.is_open())))
    }

    /// The last access policy fetched for a catalogue group, if any.
    #[must_use]
    pub fn cached_group_policy(&self, group: &str) -> Option<AccessPolicy> {
        self.group_policies.get(group).map(|hit| *hit.value())
    }

    /// Number of resource ids cached as open.
    #[must_use]
    pub fn cached_open_resources(&self) -> usize {
        self.open_resources.len()
    }

    /// A point-in-time view of the classifier counters.
    #[must_use]
    pub fn stats(&self) -> ClassifierStatsSnapshot {
        self.stats.snapshot()
    }
}

/// Counters describing classifier behavior since startup.
#[derive(Debug, Default)]
struct ClassifierStats {
    cache_hits: AtomicU64,
    catalogue_lookups: AtomicU64,
    failures: AtomicU64,
}

impl ClassifierStats {
    fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_catalogue_lookup(&self) {
        self.catalogue_lookups.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ClassifierStatsSnapshot {
        ClassifierStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            catalogue_lookups: self.catalogue_lookups.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time classifier counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierStatsSnapshot {
    /// Ids answered from the open-resource cache.
    pub cache_hits: u64,
    /// Ids that went to the catalogue.
    pub catalogue_lookups: u64,
    /// Ids whose classification failed.
    pub failures: u64,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("open_resources", &self.open_resources.len())
            .field("group_policies", &self.group_policies.len())
            .finish_non_exhaustive()
    }
}
