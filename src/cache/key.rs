//! Cache Key Module
//!
//! Derives a stable, collision-resistant internal key from any serializable
//! caller key. Encoding is value-based: two keys that are equal by value
//! always encode to the same CacheKey, regardless of where they live in
//! memory. The digest is SHA-256 over the canonical JSON form of the key
//! (serde_json maps are ordered, so field order in composite keys does not
//! leak into the digest).

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

// == Cache Key ==
/// Opaque map identity for a stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the hex digest backing this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// == Encode ==
/// Encodes a caller-supplied key into a CacheKey.
///
/// Fails only if the key cannot be serialized, or serializes to JSON null
/// (an absent key carries no identity to cache under).
pub fn encode<K>(key: &K) -> Result<CacheKey>
where
    K: Serialize + ?Sized,
{
    let value =
        serde_json::to_value(key).map_err(|e| CacheError::InvalidKey(e.to_string()))?;

    if value.is_null() {
        return Err(CacheError::InvalidKey(
            "key serializes to null".to_string(),
        ));
    }

    let canonical = serde_json::to_string(&value)
        .map_err(|e| CacheError::InvalidKey(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();

    Ok(CacheKey(digest))
}
