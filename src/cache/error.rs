//! Cache error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// Entry is larger than the backend accepts
    #[error("Cache entry too large: {size} bytes (max {max} bytes)")]
    EntryTooLarge { size: u64, max: u64 },

    #[error("Redis connection failed: {0}")]
    RedisConnectionFailed(String),

    #[error("Redis error: {0}")]
    RedisError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CacheError {
    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            CacheError::EntryTooLarge { .. } => "entry_too_large",
            CacheError::RedisConnectionFailed(_) => "connection",
            CacheError::RedisError(_) => "backend",
            CacheError::SerializationError(_) => "serialization",
        }
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::RedisError(err.to_string())
    }
}
