//! In-memory LRU cache whose entries expire after a fixed time-to-live.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;

use crate::clock::Clock;

/// What: One cached value together with its key and expiry.
///
/// Details:
/// - Readable only while `now < expires_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<K, V> {
    /// Lookup key.
    pub key: K,
    /// Cached payload.
    pub value: V,
    /// First instant at which the entry is no longer served.
    pub expires_at: DateTime<Utc>,
}

impl<K, V> CacheEntry<K, V> {
    /// `true` while the entry may still be served.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// What: Bounded key/value cache with lazy expiry.
///
/// Inputs:
/// - `capacity`: Maximum number of live entries; the least recently used one is dropped
///   when full.
/// - `ttl`: Lifetime given to entries stored with [`TtlCache::insert`].
///
/// Details:
/// - Expired entries are treated as absent and removed on the lookup that finds them;
///   there is no background sweep.
/// - Every operation takes the lock for one synchronous step, so writes replace whole
///   entries and readers never observe a half-written value.
pub struct TtlCache<K: Hash + Eq, V> {
    /// Entries ordered by recency.
    entries: Mutex<LruCache<K, CacheEntry<K, V>>>,
    /// Lifetime of new entries.
    ttl: TimeDelta,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create an empty cache.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// Lock the entry map, recovering from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, LruCache<K, CacheEntry<K, V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// What: Look up a live entry.
    ///
    /// Output:
    /// - The full entry while fresh; `None` when absent or expired (the expired entry is
    ///   evicted).
    pub fn get_entry(&self, key: &K) -> Option<CacheEntry<K, V>> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let fresh = entries.get(key).map(|e| e.is_fresh(now))?;
        if fresh {
            entries.get(key).cloned()
        } else {
            entries.pop(key);
            tracing::trace!("evicted expired cache entry");
            None
        }
    }

    /// Look up a live value.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_entry(key).map(|e| e.value)
    }

    /// Store `value` under `key` for the configured TTL, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.insert_until(key, value, expires_at);
    }

    /// Store `value` under `key` with an explicit expiry.
    pub fn insert_until(&self, key: K, value: V, expires_at: DateTime<Utc>) {
        let entry = CacheEntry {
            key: key.clone(),
            value,
            expires_at,
        };
        self.lock().put(key, entry);
    }

    /// Drop the entry for `key`, returning its value if it was present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().pop(key).map(|e| e.value)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
