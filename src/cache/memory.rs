//! Memory cache implementation
//!
//! This module provides in-process cache implementations:
//! - `MemoryCache`: size-bounded cache backed by moka
//! - `NullCache`: no-op implementation for disabled caching

use async_trait::async_trait;
use std::time::Duration;

use super::config::MemoryCacheConfig;
use super::entry::{CacheEntry, CacheKey};
use super::error::CacheError;
use super::traits::ResponseCache;

/// MemoryCache wraps moka for the ResponseCache trait
pub struct MemoryCache {
    cache: moka::future::Cache<CacheKey, CacheEntry>,
    max_item_size_bytes: u64,
}

impl MemoryCache {
    /// Create a new MemoryCache; entries expire after `ttl_seconds`
    pub fn new(config: &MemoryCacheConfig, ttl_seconds: u64) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(config.max_capacity_bytes())
            .time_to_live(Duration::from_secs(ttl_seconds))
            .weigher(|_key, entry: &CacheEntry| {
                u32::try_from(entry.size_bytes()).unwrap_or(u32::MAX)
            })
            .build();

        Self {
            cache,
            max_item_size_bytes: config.max_item_size_bytes(),
        }
    }

    /// Forces moka to process pending evictions and expirations
    pub async fn run_pending(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Current entry count (approximate due to eventual consistency)
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Current weighted size in bytes
    pub fn weighted_size(&self) -> u64 {
        self.cache.weighted_size()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.cache.get(key).await)
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        let size = entry.size_bytes() as u64;
        if size > self.max_item_size_bytes {
            return Err(CacheError::EntryTooLarge {
                size,
                max: self.max_item_size_bytes,
            });
        }
        self.cache.insert(key, entry).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// NullCache is a no-op cache implementation used when caching is disabled
pub struct NullCache;

#[async_trait]
impl ResponseCache for NullCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _key: CacheKey, _entry: CacheEntry) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
