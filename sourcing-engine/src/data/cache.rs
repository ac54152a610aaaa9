//! Analysis cache for the orchestration layer.
//!
//! In-memory TTL cache with tag invalidation. Keys follow
//! `<domain>:<entityId>`. The scoring functions never see this cache; only
//! [`crate::engine::RecommendationEngine`] consults it.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Build a cache key for an entity.
pub fn cache_key(domain: &str, entity_id: &str) -> String {
    format!("{}:{}", domain, entity_id)
}

/// Cache entry with TTL and tags
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    tags: BTreeSet<String>,
    expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T, tags: BTreeSet<String>, ttl_secs: i64) -> Self {
        Self {
            data,
            tags,
            expires_at: expiry(Utc::now(), ttl_secs),
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// `now + ttl_secs`, saturating at the ends of the chrono range.
fn expiry(now: DateTime<Utc>, ttl_secs: i64) -> DateTime<Utc> {
    Duration::try_seconds(ttl_secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(if ttl_secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Hit/miss counters, owned by whoever wires the cache up.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Point-in-time copy of [`CacheMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// TTL cache keyed by `<domain>:<entityId>`.
pub struct AnalysisCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    default_ttl: i64,
    metrics: Arc<CacheMetrics>,
}

impl<T: Clone> AnalysisCache<T> {
    /// Create a cache with the given default TTL.
    pub fn new(default_ttl_secs: i64, metrics: Arc<CacheMetrics>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl: default_ttl_secs,
            metrics,
        }
    }

    /// Get a cached value if present and not expired.
    pub fn get(&self, key: &str) -> Option<T> {
        let value = self.entries.read().ok().and_then(|cache| {
            cache
                .get(key)
                .filter(|entry| !entry.is_expired())
                .map(|entry| entry.data.clone())
        });
        self.metrics.record(value.is_some());
        value
    }

    /// Cache a value with the default TTL.
    pub fn set<I, S>(&self, key: &str, value: T, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_with_ttl(key, value, tags, self.default_ttl);
    }

    /// Cache a value with a custom TTL.
    pub fn set_with_ttl<I, S>(&self, key: &str, value: T, tags: I, ttl_secs: i64)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags.into_iter().map(Into::into).collect();
        let entry = CacheEntry::new(value, tags, ttl_secs);

        if let Ok(mut cache) = self.entries.write() {
            cache.insert(key.to_string(), entry);
        }
    }

    /// Remove one key.
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut cache) = self.entries.write() {
            cache.remove(key);
        }
    }

    /// Remove every entry carrying `tag`. Returns how many were removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        match self.entries.write() {
            Ok(mut cache) => {
                let before = cache.len();
                cache.retain(|_, entry| !entry.tags.contains(tag));
                before - cache.len()
            }
            Err(_) => 0,
        }
    }

    /// Clear all expired entries. Returns how many were removed.
    pub fn clear_expired(&self) -> usize {
        match self.entries.write() {
            Ok(mut cache) => {
                let before = cache.len();
                cache.retain(|_, entry| !entry.is_expired());
                before - cache.len()
            }
            Err(_) => 0,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters shared with the caller.
    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }
}
