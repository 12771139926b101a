//! Lock-free grant cache keyed by raw token value.
//!
//! Every mutation is a compare-and-swap against the exact entry a reader
//! observed: extending a fresh entry's window, or removing an expired one.
//! A lost race is never retried; the caller simply falls back to the remote
//! introspection path, which re-inserts an up-to-date entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use cerberus_core::TipGrant;

/// One cached grant with its local freshness deadline.
#[derive(Debug, Clone, PartialEq)]
struct CacheEntry {
    grant: TipGrant,
    cache_expiry: DateTime<Utc>,
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A fresh grant was found (and its freshness window extended).
    Hit(TipGrant),
    /// Nothing usable cached; the caller must introspect remotely.
    Miss,
    /// The cached grant's token has expired at the source of truth.
    TokenExpired,
}

/// Concurrent token-to-grant cache with compare-and-swap semantics.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: DashMap<String, CacheEntry>,
    stats: CacheStats,
}

impl TokenCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a token, enforcing both expiries and extending the
    /// freshness window of a fresh entry by `ttl`.
    ///
    /// Expired entries are removed only if unchanged since the read; a
    /// concurrent writer winning that race leaves its own entry intact.
    /// A fresh entry whose extension CAS is lost is reported as a miss.
    pub fn lookup(&self, token: &str, now: DateTime<Utc>, ttl: StdDuration) -> CacheLookup {
        let Some(entry) = self.entries.get(token).map(|found| found.value().clone()) else {
            self.stats.record_miss();
            return CacheLookup::Miss;
        };

        if entry.grant.token_expiry <= now {
            self.compare_and_remove(token, &entry);
            self.stats.record_expired_token();
            return CacheLookup::TokenExpired;
        }

        if entry.cache_expiry <= now {
            self.compare_and_remove(token, &entry);
            self.stats.record_stale_entry();
            self.stats.record_miss();
            return CacheLookup::Miss;
        }

        let extended = CacheEntry {
            grant: entry.grant.clone(),
            cache_expiry: expiry_after(now, ttl),
        };
        if self.compare_and_swap(token, &entry, extended) {
            self.stats.record_hit();
            CacheLookup::Hit(entry.grant)
        } else {
            self.stats.record_lost_race();
            self.stats.record_miss();
            CacheLookup::Miss
        }
    }

    /// Inserts a freshly introspected grant, overwriting any entry.
    pub fn insert(&self, token: &str, grant: TipGrant, now: DateTime<Utc>, ttl: StdDuration) {
        self.entries.insert(
            token.to_string(),
            CacheEntry {
                grant,
                cache_expiry: expiry_after(now, ttl),
            },
        );
    }

    /// Drops every entry whose token or freshness window has expired.
    /// Returns how many entries were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.grant.token_expiry > now && entry.cache_expiry > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            self.stats
                .record_swept(u64::try_from(removed).unwrap_or(u64::MAX));
        }
        removed
    }

    /// Number of cached grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A point-in-time view of the cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Replaces the entry only if it still equals `expected`.
    fn compare_and_swap(&self, token: &str, expected: &CacheEntry, replacement: CacheEntry) -> bool {
        match self.entries.entry(token.to_string()) {
            Entry::Occupied(mut slot) if slot.get() == expected => {
                slot.insert(replacement);
                true
            }
            _ => false,
        }
    }

    /// Removes the entry only if it still equals `expected`.
    fn compare_and_remove(&self, token: &str, expected: &CacheEntry) -> bool {
        self.entries
            .remove_if(token, |_, current| current == expected)
            .is_some()
    }
}

fn expiry_after(now: DateTime<Utc>, ttl: StdDuration) -> DateTime<Utc> {
    Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Counters describing cache behavior since startup.
#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expired_tokens: AtomicU64,
    stale_entries: AtomicU64,
    lost_races: AtomicU64,
    swept: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_expired_token(&self) {
        self.expired_tokens.fetch_add(1, Ordering::Relaxed);
    }

    fn record_stale_entry(&self) {
        self.stale_entries.fetch_add(1, Ordering::Relaxed);
    }

    fn record_lost_race(&self) {
        self.lost_races.fetch_add(1, Ordering::Relaxed);
    }

    fn record_swept(&self, count: u64) {
        self.swept.fetch_add(count, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired_tokens: self.expired_tokens.load(Ordering::Relaxed),
            stale_entries: self.stale_entries.load(Ordering::Relaxed),
            lost_races: self.lost_races.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    /// Lookups answered from a fresh entry.
    pub hits: u64,
    /// Lookups that fell through to remote introspection.
    pub misses: u64,
    /// Lookups that found an expired token.
    pub expired_tokens: u64,
    /// Entries dropped because their freshness window had elapsed.
    pub stale_entries: u64,
    /// Extension attempts lost to a concurrent writer.
    pub lost_races: u64,
    /// Entries removed by background sweeps.
    pub swept: u64,
}

impl CacheStatsSnapshot {
    /// Fraction of lookups answered from cache, in `[0.0, 1.0]`.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant(expiry: DateTime<Utc>) -> TipGrant {
        TipGrant {
            consumer: "consumer@example.org".to_string(),
            public_consumer: None,
            provider: Some("provider.org/abc".to_string()),
            requests: vec![],
            token_expiry: expiry,
        }
    }

    const TTL: StdDuration = StdDuration::from_secs(600);

    #[test]
    fn test_miss_on_empty_cache() {
        let cache = TokenCache::new();
        assert_eq!(cache.lookup("tok", Utc::now(), TTL), CacheLookup::Miss);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_hit_returns_cached_grant() {
        let cache = TokenCache::new();
        let now = Utc::now();
        let cached = grant(now + Duration::hours(1));
        cache.insert("tok", cached.clone(), now, TTL);

        assert_eq!(
            cache.lookup("tok", now + Duration::seconds(1), TTL),
            CacheLookup::Hit(cached)
        );
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_expired_token_is_removed_and_reported() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache.insert("tok", grant(now + Duration::seconds(30)), now, TTL);

        let later = now + Duration::seconds(31);
        assert_eq!(cache.lookup("tok", later, TTL), CacheLookup::TokenExpired);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expired_tokens, 1);
    }

    #[test]
    fn test_stale_entry_falls_back_to_miss() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache.insert("tok", grant(now + Duration::hours(2)), now, StdDuration::from_secs(60));

        let later = now + Duration::seconds(61);
        assert_eq!(cache.lookup("tok", later, TTL), CacheLookup::Miss);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().stale_entries, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_hit_extends_freshness_window() {
        let cache = TokenCache::new();
        let now = Utc::now();
        let ttl = StdDuration::from_secs(10);
        cache.insert("tok", grant(now + Duration::hours(2)), now, ttl);

        // Hit at +5s pushes the window to +15s.
        assert!(matches!(
            cache.lookup("tok", now + Duration::seconds(5), ttl),
            CacheLookup::Hit(_)
        ));
        // Without the extension this would be stale at +12s.
        assert!(matches!(
            cache.lookup("tok", now + Duration::seconds(12), ttl),
            CacheLookup::Hit(_)
        ));
    }

    #[test]
    fn test_lost_swap_race_leaves_winner_intact() {
        let cache = TokenCache::new();
        let now = Utc::now();
        let stale = CacheEntry {
            grant: grant(now + Duration::hours(1)),
            cache_expiry: now + Duration::minutes(10),
        };
        cache.insert("tok", stale.grant.clone(), now, TTL);

        // A concurrent writer replaces the entry before our CAS lands.
        let winner = grant(now + Duration::hours(3));
        cache.insert("tok", winner.clone(), now, TTL);

        let replacement = CacheEntry {
            grant: stale.grant.clone(),
            cache_expiry: now + Duration::minutes(20),
        };
        assert!(!cache.compare_and_swap("tok", &stale, replacement));
        assert_eq!(
            cache.lookup("tok", now + Duration::seconds(1), TTL),
            CacheLookup::Hit(winner)
        );
    }

    #[test]
    fn test_lost_remove_race_leaves_winner_intact() {
        let cache = TokenCache::new();
        let now = Utc::now();
        let stale = CacheEntry {
            grant: grant(now + Duration::hours(1)),
            cache_expiry: now + Duration::minutes(10),
        };
        let winner = grant(now + Duration::hours(3));
        cache.insert("tok", winner.clone(), now, TTL);

        assert!(!cache.compare_and_remove("tok", &stale));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_drops_both_expiry_kinds() {
        let cache = TokenCache::new();
        let now = Utc::now();
        // Token expired.
        cache.insert("dead-token", grant(now - Duration::seconds(1)), now, TTL);
        // Freshness window elapsed.
        cache.insert(
            "stale-entry",
            grant(now + Duration::hours(1)),
            now - Duration::hours(1),
            StdDuration::from_secs(60),
        );
        // Live.
        cache.insert("live", grant(now + Duration::hours(1)), now, TTL);

        assert_eq!(cache.sweep(now), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().swept, 2);
        assert!(matches!(
            cache.lookup("live", now, TTL),
            CacheLookup::Hit(_)
        ));
    }

    #[test]
    fn test_hit_rate() {
        let snapshot = CacheStatsSnapshot {
            hits: 3,
            misses: 1,
            expired_tokens: 0,
            stale_entries: 0,
            lost_races: 0,
            swept: 0,
        };
        assert!((snapshot.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
