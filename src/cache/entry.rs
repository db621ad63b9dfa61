//! Cache Entry Module
//!
//! Defines per-entry TTL semantics and the structure of individual cache
//! entries. Expiration is independent of eviction: an entry goes stale when
//! its deadline passes, whether or not the cache is anywhere near capacity.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == TTL ==
/// Per-store time-to-live selection.
///
/// An explicit tagged type instead of sentinel durations: `UseDefault` defers
/// to the cache-wide default, `Never` means the entry never expires, and
/// `After(Duration::ZERO)` means stale on the very next read. Durations are
/// truncated to whole seconds; sub-second precision is not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Use the cache's configured default TTL
    UseDefault,
    /// Never expire
    Never,
    /// Expire after the given duration (truncated to whole seconds)
    After(Duration),
}

impl Ttl {
    /// Resolves this TTL against the cache default into an absolute deadline
    /// (Unix milliseconds), or None for entries that never expire. Extreme
    /// durations saturate to the far future instead of overflowing.
    pub fn deadline(&self, default_ttl: Duration, now_ms: u64) -> Option<u64> {
        let after = |duration: &Duration| {
            now_ms.saturating_add(duration.as_secs().saturating_mul(1000))
        };
        match self {
            Ttl::UseDefault => Some(after(&default_ttl)),
            Ttl::Never => None,
            Ttl::After(duration) => Some(after(duration)),
        }
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and expiration metadata.
///
/// Created whole on store and never mutated afterwards, except for the
/// refresh flag driving stampede control; a later store under the same key
/// replaces the entry entirely.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = never expires
    pub expires_at: Option<u64>,
    /// Set while one caller holds the right to refresh this stale entry
    pub refreshing: bool,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with the given absolute deadline.
    pub fn new(value: V, expires_at: Option<u64>) -> Self {
        Self {
            value,
            created_at: current_timestamp_ms(),
            expires_at,
            refreshing: false,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the deadline, so a zero TTL is stale
    /// immediately.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if the entry never
    /// expires. Returns `Some(0)` once the deadline has passed.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            expires.saturating_sub(now)
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
