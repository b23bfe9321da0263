// Cache module
//
// Storage behind the cache-aside fetcher. The backend is chosen once from
// configuration and shared as `Arc<dyn ResponseCache>`.

use std::sync::Arc;

pub mod config;
pub mod entry;
pub mod error;
pub mod memory;
pub mod redis;
pub mod traits;

pub use config::{CacheBackend, CacheConfig, MemoryCacheConfig, RedisCacheConfig};
pub use entry::{CacheEntry, CacheKey};
pub use error::CacheError;
pub use memory::{MemoryCache, NullCache};
pub use self::redis::RedisCache;
pub use traits::ResponseCache;

/// Build the configured cache backend
pub fn build_cache(config: &CacheConfig) -> Result<Arc<dyn ResponseCache>, CacheError> {
    let cache: Arc<dyn ResponseCache> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new(&config.memory, config.max_age_seconds)),
        CacheBackend::Redis => Arc::new(RedisCache::new(&config.redis, config.max_age_seconds)?),
        CacheBackend::Disabled => Arc::new(NullCache),
    };
    tracing::info!(backend = cache.name(), "Response cache initialized");
    Ok(cache)
}
