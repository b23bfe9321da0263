// Redis cache entry serialization using MessagePack

use crate::cache::{CacheEntry, CacheError};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Serialization format version for schema evolution
const SERIALIZATION_VERSION: u8 = 1;

/// Serializable wrapper for CacheEntry with version marker
#[derive(Debug, Serialize, Deserialize)]
struct SerializableCacheEntry {
    version: u8,
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    /// Seconds since UNIX_EPOCH
    created_at_secs: u64,
}

/// Serializes a CacheEntry to MessagePack bytes with a version marker
pub fn serialize_entry(entry: &CacheEntry) -> Result<Vec<u8>, CacheError> {
    let serializable = SerializableCacheEntry {
        version: SERIALIZATION_VERSION,
        status: entry.status,
        headers: entry.headers.clone(),
        body: entry.body.to_vec(),
        created_at_secs: entry
            .created_at
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|e| CacheError::SerializationError(format!("Invalid created_at: {}", e)))?
            .as_secs(),
    };

    rmp_serde::to_vec(&serializable)
        .map_err(|e| CacheError::SerializationError(format!("MessagePack encoding failed: {}", e)))
}

/// Deserializes MessagePack bytes to a CacheEntry
///
/// # Errors
/// Returns CacheError::SerializationError if the data is corrupt, truncated
/// or written with another schema version.
pub fn deserialize_entry(bytes: &[u8]) -> Result<CacheEntry, CacheError> {
    let serializable: SerializableCacheEntry = rmp_serde::from_slice(bytes).map_err(|e| {
        CacheError::SerializationError(format!("MessagePack decoding failed: {}", e))
    })?;

    if serializable.version != SERIALIZATION_VERSION {
        return Err(CacheError::SerializationError(format!(
            "Unsupported schema version: {} (expected: {})",
            serializable.version, SERIALIZATION_VERSION
        )));
    }

    if !(100..=999).contains(&serializable.status) {
        return Err(CacheError::SerializationError(format!(
            "Invalid entry: status {} out of range",
            serializable.status
        )));
    }

    Ok(CacheEntry {
        status: serializable.status,
        headers: serializable.headers,
        body: Bytes::from(serializable.body),
        created_at: SystemTime::UNIX_EPOCH + Duration::from_secs(serializable.created_at_secs),
    })
}
