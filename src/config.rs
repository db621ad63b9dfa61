//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

use crate::cache::EvictionMode;
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// Captured once at construction; only the default TTL is mutable afterwards,
/// through the service facade. All values can be configured via environment
/// variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Eviction algorithm used when the cache is over capacity
    pub algorithm: EvictionMode,
    /// Maximum number of entries, -1 means unbounded
    pub capacity: i64,
    /// Blocking stampede control: stale reads park behind a single refresher
    /// instead of serving the stale value
    pub blocking: bool,
    /// Default TTL in seconds for entries stored without an explicit TTL
    pub default_ttl: u64,
    /// Background sweep interval in seconds, 0 disables the sweeper
    pub sweep_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ALGORITHM` - `lru`, `fifo` or `unlimited` (default: lru)
    /// - `CACHE_CAPACITY` - Maximum entries, -1 = unbounded (default: 1000)
    /// - `CACHE_BLOCKING` - Blocking stampede control (default: false)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds, 0 = off (default: 0)
    pub fn from_env() -> Self {
        Self {
            algorithm: env::var("CACHE_ALGORITHM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(EvictionMode::Lru),
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            blocking: env::var("CACHE_BLOCKING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Validates the configuration.
    ///
    /// Rejects a capacity below -1 and a zero default TTL. A zero default
    /// would make every defaulted store stale on its next read, which is
    /// never the intent of a process-wide default; callers that want
    /// immediate staleness or no expiry request it per store.
    pub fn validate(&self) -> Result<()> {
        if self.capacity < -1 {
            return Err(CacheError::InvalidConfig(format!(
                "capacity must be -1 (unbounded) or non-negative, got {}",
                self.capacity
            )));
        }
        if self.default_ttl == 0 {
            return Err(CacheError::InvalidConfig(
                "default TTL must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            algorithm: EvictionMode::Lru,
            capacity: 1000,
            blocking: false,
            default_ttl: 300,
            sweep_interval: 0,
        }
    }
}
