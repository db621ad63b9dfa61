//! Concurrent Cache Module
//!
//! Thread-safe cache wrapping the store engine behind a single RwLock and
//! driving the stale-read state machine: FRESH, STALE-UNCLAIMED and
//! STALE-PENDING. Blocking mode parks readers of a pending key on a per-key
//! watch channel and wakes them when the claim resolves (new value stored,
//! claim released, entry removed, or cache cleared). Parked readers hold no
//! lock; recency updates and map mutations stay atomic under the lock.
//!
//! Clearing the cache forcibly resolves every pending claim: all parked
//! readers wake and observe absent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::cache::key::{self, CacheKey};
use crate::cache::store::{CacheStore, Lookup};
use crate::cache::{CacheStats, EvictionMode, Ttl};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Shared State ==
/// Map, eviction bookkeeping and pending-claim registry, guarded together.
#[derive(Debug)]
struct Inner<V> {
    store: CacheStore<V>,
    /// One sender per key with a pending refresh; dropping it wakes waiters
    claims: HashMap<CacheKey, watch::Sender<()>>,
}

// == Cache ==
/// Concurrent cache with pluggable eviction, per-entry TTL and stampede
/// control. Cheap to clone; clones share the same storage.
#[derive(Debug)]
pub struct Cache<V> {
    inner: Arc<RwLock<Inner<V>>>,
    /// Fixed at construction: park stale readers behind one refresher
    /// instead of serving the stale value
    blocking: bool,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            blocking: self.blocking,
        }
    }
}

impl<V: Clone> Cache<V> {
    // == Constructor ==
    /// Creates a cache from a validated configuration.
    ///
    /// Capacity is ignored in unlimited mode and when negative; otherwise
    /// the live entry count never exceeds it.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;

        let capacity = if config.algorithm == EvictionMode::Unlimited || config.capacity < 0 {
            None
        } else {
            Some(config.capacity as usize)
        };

        let store = CacheStore::new(
            config.algorithm.tracker(),
            capacity,
            Duration::from_secs(config.default_ttl),
        );

        debug!(
            algorithm = ?config.algorithm,
            capacity = config.capacity,
            blocking = config.blocking,
            default_ttl = config.default_ttl,
            "cache initialized"
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(Inner {
                store,
                claims: HashMap::new(),
            })),
            blocking: config.blocking,
        })
    }

    // == Read ==
    /// Reads a value by key.
    ///
    /// Misses return `None`, never an error. For a stale entry the behavior
    /// depends on the mode fixed at construction:
    /// - Non-blocking: the stale value is returned immediately and the entry
    ///   is marked pending so other callers can see a refresh is expected.
    /// - Blocking: the first caller to find the entry stale claims the
    ///   refresh and gets `None` (it is expected to store a new value or
    ///   call [`release`](Self::release)); every other caller parks until
    ///   the claim resolves.
    pub async fn read<K>(&self, key: &K) -> Result<Option<V>>
    where
        K: Serialize + ?Sized,
    {
        let key = key::encode(key)?;
        Ok(self.read_encoded(&key).await)
    }

    /// Reads a value by key, giving up after `timeout` if parked behind a
    /// pending refresh. Timing out does not disturb the pending claim.
    pub async fn read_with_timeout<K>(&self, key: &K, timeout: Duration) -> Result<Option<V>>
    where
        K: Serialize + ?Sized,
    {
        let key = key::encode(key)?;
        match tokio::time::timeout(timeout, self.read_encoded(&key)).await {
            Ok(value) => Ok(value),
            Err(_) => Err(CacheError::WaitTimeout(format!(
                "key {} not refreshed within {:?}",
                key, timeout
            ))),
        }
    }

    async fn read_encoded(&self, key: &CacheKey) -> Option<V> {
        loop {
            let mut rx = {
                let mut inner = self.inner.write().await;
                match inner.store.lookup(key) {
                    Lookup::Fresh(value) => return Some(value),
                    Lookup::Absent => return None,
                    Lookup::Stale { value, refreshing } => {
                        if !self.blocking {
                            if !refreshing {
                                inner.store.claim(key);
                            }
                            // Serve-stale-while-revalidate
                            return Some(value);
                        }
                        if !refreshing && inner.store.claim(key) {
                            // This caller becomes the refresher; the channel
                            // lets later readers park until it resolves
                            inner
                                .claims
                                .entry(key.clone())
                                .or_insert_with(|| watch::channel(()).0);
                            return None;
                        }
                        let tx = inner
                            .claims
                            .entry(key.clone())
                            .or_insert_with(|| watch::channel(()).0);
                        tx.subscribe()
                    }
                }
            };
            // Parked without the lock. Resolution closes or signals the
            // channel; either way we wake and re-check the entry state.
            let _ = rx.changed().await;
        }
    }

    // == Lookup ==
    /// Inspects a key without waiting or claiming, reporting its freshness
    /// as a tagged result. A pure inspection: recency and statistics are
    /// left untouched. Useful for callers that drive their own refresh
    /// decisions off the `Stale { refreshing }` flag.
    pub async fn lookup<K>(&self, key: &K) -> Result<Lookup<V>>
    where
        K: Serialize + ?Sized,
    {
        let key = key::encode(key)?;
        let inner = self.inner.read().await;
        Ok(inner.store.peek(&key))
    }

    // == Store ==
    /// Stores a value under a key with the default TTL.
    pub async fn store<K>(&self, key: &K, value: V) -> Result<()>
    where
        K: Serialize + ?Sized,
    {
        self.store_with_ttl(key, value, Ttl::UseDefault).await
    }

    /// Stores a value under a key with an explicit TTL.
    ///
    /// Replaces any existing entry, resolves a pending refresh claim on the
    /// key, and wakes readers parked on it; they observe the new value.
    pub async fn store_with_ttl<K>(&self, key: &K, value: V, ttl: Ttl) -> Result<()>
    where
        K: Serialize + ?Sized,
    {
        let key = key::encode(key)?;
        let mut inner = self.inner.write().await;
        let evicted = inner.store.insert(key.clone(), value, ttl);
        inner.claims.remove(&key);
        if let Some(victim) = evicted {
            // An evicted entry may have had waiters; they resolve to absent
            inner.claims.remove(&victim);
        }
        Ok(())
    }

    // == Release ==
    /// Reverts a pending refresh claim without storing a value.
    ///
    /// The entry returns to stale-unclaimed; parked readers wake and exactly
    /// one of them is promoted to refresher.
    pub async fn release<K>(&self, key: &K) -> Result<()>
    where
        K: Serialize + ?Sized,
    {
        let key = key::encode(key)?;
        let mut inner = self.inner.write().await;
        inner.store.release(&key);
        inner.claims.remove(&key);
        Ok(())
    }

    // == Remove ==
    /// Removes an entry, returning the previously stored value. Readers
    /// parked on the key wake and observe absent.
    pub async fn remove<K>(&self, key: &K) -> Result<Option<V>>
    where
        K: Serialize + ?Sized,
    {
        let key = key::encode(key)?;
        let mut inner = self.inner.write().await;
        let previous = inner.store.remove(&key);
        inner.claims.remove(&key);
        Ok(previous)
    }

    // == Clear ==
    /// Empties the cache, resets eviction bookkeeping and forcibly resolves
    /// every pending claim: all parked readers wake and observe absent.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.store.clear();
        inner.claims.clear();
    }

    // == Purge Expired ==
    /// Removes expired, unclaimed entries. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        inner.store.purge_expired()
    }

    // == Accessors ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.store.stats()
    }

    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.store.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.store.is_empty()
    }

    /// Returns whether blocking stampede control is active.
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Returns the default TTL applied to stores without an explicit TTL.
    pub async fn default_ttl(&self) -> Duration {
        self.inner.read().await.store.default_ttl()
    }

    /// Replaces the default TTL. Rejects durations under one second, which
    /// would make every defaulted store stale immediately.
    pub async fn set_default_ttl(&self, default_ttl: Duration) -> Result<()> {
        if default_ttl.as_secs() == 0 {
            return Err(CacheError::InvalidConfig(
                "default TTL must be at least one second".to_string(),
            ));
        }
        self.inner.write().await.store.set_default_ttl(default_ttl);
        Ok(())
    }
}
