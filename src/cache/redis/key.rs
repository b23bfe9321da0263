// Redis key formatting and hashing utilities

use sha2::{Digest, Sha256};

use crate::cache::CacheKey;
use crate::constants::MAX_REDIS_KEY_LENGTH;

/// Formats a Redis key for an inbound request identity
///
/// # Format
/// - Short keys: "{prefix}:{method}:{host}{encoded path?query}"
/// - Long keys: "{prefix}:hash:{sha256}"
pub fn format_key(prefix: &str, key: &CacheKey) -> String {
    // URL encode the path to keep separators and spaces out of the key
    let encoded = urlencoding::encode(&key.path_and_query);
    let full_key = format!("{}:{}:{}{}", prefix, key.method, key.host, encoded);

    if full_key.len() > MAX_REDIS_KEY_LENGTH {
        hash_long_key(prefix, key)
    } else {
        full_key
    }
}

fn hash_long_key(prefix: &str, key: &CacheKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.method.as_bytes());
    hasher.update(b":");
    hasher.update(key.host.as_bytes());
    hasher.update(key.path_and_query.as_bytes());

    format!("{}:hash:{}", prefix, hex::encode(hasher.finalize()))
}
