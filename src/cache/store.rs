//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with pluggable eviction
//! tracking and TTL expiration. This layer is single-threaded; the
//! concurrent wrapper in `core` owns it behind a lock and drives the
//! stale-read state machine on top of the tagged lookup results returned
//! here.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheKey, CacheStats, EvictionTracker, Ttl};

// == Lookup Result ==
/// Tagged result of a cache lookup.
///
/// Staleness is a value, not an error: callers branch on the tag instead of
/// catching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// The entry exists and has not expired
    Fresh(V),
    /// The entry exists but its deadline has passed
    Stale {
        /// The last stored value
        value: V,
        /// Whether a caller already claimed the refresh for this key
        refreshing: bool,
    },
    /// No entry under this key
    Absent,
}

// == Cache Store ==
/// Cache storage with pluggable eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<CacheKey, CacheEntry<V>>,
    /// Eviction bookkeeping, updated under the same lock as the map
    tracker: Box<dyn EvictionTracker>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries, None = unbounded
    capacity: Option<usize>,
    /// Default TTL for entries stored with Ttl::UseDefault
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `tracker` - Eviction bookkeeping implementation
    /// * `capacity` - Maximum entry count, None for unbounded
    /// * `default_ttl` - TTL applied when a store does not carry its own
    pub fn new(
        tracker: Box<dyn EvictionTracker>,
        capacity: Option<usize>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            tracker,
            stats: CacheStats::new(),
            capacity,
            default_ttl,
        }
    }

    // == Insert ==
    /// Stores a key-value pair, replacing any existing entry under the key.
    ///
    /// If the insertion would push the live entry count above capacity,
    /// exactly one victim is evicted first. Returns the evicted key, if any,
    /// so the concurrent layer can resolve waiters parked on it. When the
    /// tracker declines to name a victim (unbounded tracker with an explicit
    /// capacity, or capacity zero) the new entry is not admitted.
    pub fn insert(&mut self, key: CacheKey, value: V, ttl: Ttl) -> Option<CacheKey> {
        let is_overwrite = self.entries.contains_key(&key);

        let mut evicted = None;
        if !is_overwrite {
            if let Some(max) = self.capacity {
                if self.entries.len() >= max {
                    match self.tracker.select_victim() {
                        Some(victim) => {
                            let removed = self.entries.remove(&victim);
                            debug_assert!(
                                removed.is_some(),
                                "eviction tracker selected a key absent from the map"
                            );
                            self.stats.record_eviction();
                            evicted = Some(victim);
                        }
                        None => {
                            // At capacity with no victim available: do not admit
                            return None;
                        }
                    }
                }
            }
        }

        let deadline = ttl.deadline(self.default_ttl, current_timestamp_ms());
        self.entries.insert(key.clone(), CacheEntry::new(value, deadline));
        self.tracker.note_insert(&key);
        self.stats.set_total_entries(self.entries.len());

        evicted
    }

    // == Lookup ==
    /// Looks up a key and reports its freshness.
    ///
    /// Fresh reads refresh eviction recency and count as hits. Stale entries
    /// are left in place so the concurrent layer can serve or refresh them;
    /// they count as an expiration plus a miss. Absent keys count as misses.
    pub fn lookup(&mut self, key: &CacheKey) -> Lookup<V> {
        match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                Lookup::Absent
            }
            Some(entry) if entry.is_expired() => {
                self.stats.record_expiration();
                self.stats.record_miss();
                Lookup::Stale {
                    value: entry.value.clone(),
                    refreshing: entry.refreshing,
                }
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.tracker.note_access(key);
                Lookup::Fresh(value)
            }
        }
    }

    // == Peek ==
    /// Reports a key's freshness without side effects: recency and
    /// statistics are left untouched.
    pub fn peek(&self, key: &CacheKey) -> Lookup<V> {
        match self.entries.get(key) {
            None => Lookup::Absent,
            Some(entry) if entry.is_expired() => Lookup::Stale {
                value: entry.value.clone(),
                refreshing: entry.refreshing,
            },
            Some(entry) => Lookup::Fresh(entry.value.clone()),
        }
    }

    // == Claim ==
    /// Marks a stale entry as pending refresh.
    ///
    /// Returns true if this caller won the claim, false if the entry is
    /// already claimed or does not exist.
    pub fn claim(&mut self, key: &CacheKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if !entry.refreshing => {
                entry.refreshing = true;
                true
            }
            _ => false,
        }
    }

    // == Release ==
    /// Reverts a pending refresh claim, leaving the entry stale-unclaimed.
    pub fn release(&mut self, key: &CacheKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.refreshing = false;
        }
    }

    // == Remove ==
    /// Removes an entry by key, returning the previously stored value.
    pub fn remove(&mut self, key: &CacheKey) -> Option<V> {
        match self.entries.remove(key) {
            Some(entry) => {
                self.tracker.note_remove(key);
                self.stats.set_total_entries(self.entries.len());
                Some(entry.value)
            }
            None => None,
        }
    }

    // == Clear ==
    /// Atomically empties the cache and resets eviction bookkeeping.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.tracker.reset();
        self.stats.set_total_entries(0);
    }

    // == Purge Expired ==
    /// Removes expired entries that no caller has claimed for refresh.
    ///
    /// Claimed entries stay: their refresher is about to overwrite them and
    /// waiters may be parked on the key. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let expired_keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired() && !entry.refreshing)
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.tracker.note_remove(&key);
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Default TTL ==
    /// Returns the default TTL applied to stores without an explicit TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Replaces the default TTL. Entries already stored keep their deadline.
    pub fn set_default_ttl(&mut self, default_ttl: Duration) {
        self.default_ttl = default_ttl;
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
