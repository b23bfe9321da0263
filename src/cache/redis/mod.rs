// Redis cache implementation module
//
// Shared cache across edge nodes. Entries are MessagePack-encoded and written
// with `SET key value EX ttl`; the connection manager is created on first use
// so the cache can be built before the async runtime starts.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;
use tokio::sync::OnceCell;

use crate::cache::{CacheEntry, CacheError, CacheKey, RedisCacheConfig, ResponseCache};

pub mod key;
pub mod serialization;

pub use key::format_key;
pub use serialization::{deserialize_entry, serialize_entry};

/// Redis-based distributed cache implementation
pub struct RedisCache {
    client: Client,
    /// Connection manager (async, multiplexed, reconnecting)
    connection: OnceCell<ConnectionManager>,
    key_prefix: String,
    ttl_seconds: u64,
}

impl RedisCache {
    /// Creates a RedisCache without connecting
    ///
    /// # Errors
    ///
    /// Returns CacheError::RedisConnectionFailed if the URL is missing or invalid.
    pub fn new(config: &RedisCacheConfig, ttl_seconds: u64) -> Result<Self, CacheError> {
        let redis_url = config.url.as_deref().ok_or_else(|| {
            CacheError::RedisConnectionFailed("cache.redis.url is required".to_string())
        })?;

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::RedisConnectionFailed(format!("Invalid Redis URL: {}", e))
        })?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            key_prefix: config.key_prefix.clone(),
            ttl_seconds,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|e| {
                        CacheError::RedisConnectionFailed(format!(
                            "Failed to connect to Redis: {}",
                            e
                        ))
                    })
            })
            .await?;
        Ok(manager.clone())
    }

    pub fn redis_key(&self, key: &CacheKey) -> String {
        format_key(&self.key_prefix, key)
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = redis::cmd("GET")
            .arg(self.redis_key(key))
            .query_async(&mut conn)
            .await?;

        raw.map(|bytes| deserialize_entry(&bytes)).transpose()
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        let payload = serialize_entry(&entry)?;
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("SET")
            .arg(self.redis_key(&key))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
