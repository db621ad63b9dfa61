//! Stalecache - an in-memory cache library
//!
//! Provides concurrent caching with pluggable eviction (LRU, FIFO,
//! unlimited), per-entry TTL expiration and stampede control: when many
//! callers hit an expired key at once, the cache either serves the stale
//! value while one refresh proceeds, or parks all but one caller behind a
//! single refresher.

pub mod cache;
pub mod config;
pub mod error;
pub mod service;
pub mod tasks;

pub use cache::{Cache, CacheStats, EvictionMode, Lookup, Ttl};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use service::CacheService;
pub use tasks::spawn_sweeper_task;
