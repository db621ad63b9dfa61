//! Error types for the cache library
//!
//! Provides unified error handling using thiserror.
//!
//! Cache misses and stale entries are NOT errors: reads report them as
//! ordinary absent/stale results so callers can branch without error
//! handling. Only invalid input and invalid configuration abort an
//! operation.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache library.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key could not be encoded (failed to serialize, or serialized to null)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Configuration value out of range (capacity below -1, zero default TTL)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unrecognized eviction algorithm selector
    #[error("Unsupported eviction algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A blocking read did not resolve within the caller-supplied timeout
    #[error("Timed out waiting for refresh: {0}")]
    WaitTimeout(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache library.
pub type Result<T> = std::result::Result<T, CacheError>;
