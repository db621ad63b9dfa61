//! Cache Module
//!
//! Provides in-memory caching with pluggable eviction, per-entry TTL
//! expiration and stampede control for concurrent stale reads.

mod core;
mod entry;
mod eviction;
pub(crate) mod key;
mod stats;
mod store;


// Re-export public types
pub use self::core::Cache;
pub use entry::{CacheEntry, Ttl};
pub use eviction::{EvictionMode, EvictionTracker, FifoTracker, LruTracker, UnboundedTracker};
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup};
