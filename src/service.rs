//! Cache Service Module
//!
//! Public facade over the concurrent cache: the store/read/remove/clear
//! contract application code programs against. Owns the optional background
//! sweeper, so dropping the service tears the whole cache down. A service
//! that exists is initialized; there is no usable-before-init state to
//! guard against.

use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{Cache, CacheStats, Lookup, Ttl};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::spawn_sweeper_task;

// == Cache Service ==
/// Facade wiring the cache core, key encoding and the background sweeper
/// together behind the public contract.
#[derive(Debug)]
pub struct CacheService<V> {
    cache: Cache<V>,
    sweeper: Option<JoinHandle<()>>,
}

impl<V> CacheService<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a service without a background sweeper; expired entries are
    /// reclaimed lazily on read.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(config)?,
            sweeper: None,
        })
    }

    /// Creates a service from configuration, spawning the background
    /// sweeper when `sweep_interval` is non-zero.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let cache = Cache::new(config)?;
        let sweeper = if config.sweep_interval > 0 {
            Some(spawn_sweeper_task(cache.clone(), config.sweep_interval))
        } else {
            None
        };
        info!(
            sweeper = sweeper.is_some(),
            "cache service initialized"
        );
        Ok(Self { cache, sweeper })
    }

    // == Store ==
    /// Stores a value under a key with the default TTL.
    pub async fn store<K>(&self, key: &K, value: V) -> Result<()>
    where
        K: Serialize + ?Sized,
    {
        self.cache.store(key, value).await
    }

    /// Stores a value under a key with an explicit TTL.
    pub async fn store_with_ttl<K>(&self, key: &K, value: V, ttl: Ttl) -> Result<()>
    where
        K: Serialize + ?Sized,
    {
        self.cache.store_with_ttl(key, value, ttl).await
    }

    // == Read ==
    /// Reads a value by key; `None` is an ordinary miss, not an error.
    pub async fn read<K>(&self, key: &K) -> Result<Option<V>>
    where
        K: Serialize + ?Sized,
    {
        self.cache.read(key).await
    }

    /// Reads a value by key, bounding the time spent parked behind a
    /// pending refresh in blocking mode.
    pub async fn read_with_timeout<K>(&self, key: &K, timeout: Duration) -> Result<Option<V>>
    where
        K: Serialize + ?Sized,
    {
        self.cache.read_with_timeout(key, timeout).await
    }

    /// Inspects a key without waiting, claiming, or touching recency and
    /// statistics.
    pub async fn lookup<K>(&self, key: &K) -> Result<Lookup<V>>
    where
        K: Serialize + ?Sized,
    {
        self.cache.lookup(key).await
    }

    // == Release ==
    /// Hands back a refresh claim this caller cannot fulfil.
    pub async fn release<K>(&self, key: &K) -> Result<()>
    where
        K: Serialize + ?Sized,
    {
        self.cache.release(key).await
    }

    // == Remove ==
    /// Removes an entry, returning the previously stored value.
    pub async fn remove<K>(&self, key: &K) -> Result<Option<V>>
    where
        K: Serialize + ?Sized,
    {
        self.cache.remove(key).await
    }

    // == Clear ==
    /// Empties the cache and resolves all pending refresh claims.
    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    // == Accessors ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.cache.len().await
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.cache.is_empty().await
    }

    /// Returns the default TTL applied to stores without an explicit TTL.
    pub async fn default_ttl(&self) -> Duration {
        self.cache.default_ttl().await
    }

    /// Replaces the default TTL; rejects sub-second durations.
    pub async fn set_default_ttl(&self, default_ttl: Duration) -> Result<()> {
        self.cache.set_default_ttl(default_ttl).await
    }

    // == Shutdown ==
    /// Stops the background sweeper. The cache itself stays readable until
    /// dropped; calling this twice is harmless.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
            info!("cache sweeper stopped");
        }
    }
}

impl<V> Drop for CacheService<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}
