//! Eviction Strategy Module
//!
//! Pluggable eviction algorithms deciding which entry to discard when the
//! cache is over capacity. The store notifies the tracker of every insert,
//! access and removal under the same lock as the map mutation, so tracker
//! bookkeeping and map contents never drift apart.

use std::collections::VecDeque;
use std::str::FromStr;

use crate::cache::CacheKey;
use crate::error::CacheError;

// == Eviction Mode ==
/// Eviction algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionMode {
    /// Evict the least recently accessed entry
    Lru,
    /// Evict the earliest inserted entry, regardless of access pattern
    Fifo,
    /// Never evict; capacity is ignored
    Unlimited,
}

impl EvictionMode {
    /// Builds the tracker implementing this mode.
    pub fn tracker(&self) -> Box<dyn EvictionTracker> {
        match self {
            EvictionMode::Lru => Box::new(LruTracker::new()),
            EvictionMode::Fifo => Box::new(FifoTracker::new()),
            EvictionMode::Unlimited => Box::new(UnboundedTracker),
        }
    }
}

impl FromStr for EvictionMode {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionMode::Lru),
            "fifo" => Ok(EvictionMode::Fifo),
            "unlimited" => Ok(EvictionMode::Unlimited),
            other => Err(CacheError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

// == Eviction Tracker Trait ==
/// Bookkeeping behind an eviction algorithm.
///
/// `select_victim` removes and returns the key to discard, or None when the
/// algorithm declines to evict (the unbounded tracker always declines).
pub trait EvictionTracker: Send + Sync + std::fmt::Debug {
    /// Records an insertion (or overwrite) of a key.
    fn note_insert(&mut self, key: &CacheKey);
    /// Records a successful fresh read of a key.
    fn note_access(&mut self, key: &CacheKey);
    /// Records the removal of a key.
    fn note_remove(&mut self, key: &CacheKey);
    /// Picks the next eviction victim and forgets it.
    fn select_victim(&mut self) -> Option<CacheKey>;
    /// Forgets all tracked keys.
    fn reset(&mut self);
    /// Returns the number of tracked keys.
    fn len(&self) -> usize;
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Order of keys by access time
    order: VecDeque<CacheKey>,
}

impl LruTracker {
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    /// Marks a key as most recently used.
    fn touch(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.clone());
    }
}

impl EvictionTracker for LruTracker {
    fn note_insert(&mut self, key: &CacheKey) {
        self.touch(key);
    }

    fn note_access(&mut self, key: &CacheKey) {
        self.touch(key);
    }

    fn note_remove(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
    }

    fn select_victim(&mut self) -> Option<CacheKey> {
        self.order.pop_back()
    }

    fn reset(&mut self) {
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

// == FIFO Tracker ==
/// Tracks insertion order for FIFO eviction.
///
/// Accesses never reorder keys; only insertion does. An overwrite counts as
/// a new insertion and moves the key to the back of the eviction queue.
#[derive(Debug, Default)]
pub struct FifoTracker {
    /// Keys in insertion order, front = most recently inserted
    order: VecDeque<CacheKey>,
}

impl FifoTracker {
    /// Creates a new empty FIFO tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }
}

impl EvictionTracker for FifoTracker {
    fn note_insert(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.clone());
    }

    fn note_access(&mut self, _key: &CacheKey) {
        // FIFO ignores access patterns
    }

    fn note_remove(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
    }

    fn select_victim(&mut self) -> Option<CacheKey> {
        self.order.pop_back()
    }

    fn reset(&mut self) {
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

// == Unbounded Tracker ==
/// No-op tracker for the unlimited mode: never selects a victim.
#[derive(Debug, Default)]
pub struct UnboundedTracker;

impl EvictionTracker for UnboundedTracker {
    fn note_insert(&mut self, _key: &CacheKey) {}

    fn note_access(&mut self, _key: &CacheKey) {}

    fn note_remove(&mut self, _key: &CacheKey) {}

    fn select_victim(&mut self) -> Option<CacheKey> {
        None
    }

    fn reset(&mut self) {}

    fn len(&self) -> usize {
        0
    }
}
