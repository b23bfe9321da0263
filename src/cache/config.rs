//! Cache configuration.
//!
//! `max_age_seconds` drives both the `cache-control` header written on every
//! fetched response and the TTL of stored entries.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_CACHE_SIZE_MB, DEFAULT_MAX_ITEM_SIZE_MB, DEFAULT_REDIS_KEY_PREFIX, ONE_YEAR_SECS,
};

/// Which store backs the cache-aside fetcher
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
    Disabled,
}

fn default_max_age_seconds() -> u64 {
    ONE_YEAR_SECS
}

fn default_store_error_responses() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// Public max-age written on responses and TTL of stored entries
    #[serde(default = "default_max_age_seconds")]
    pub max_age_seconds: u64,
    /// Whether origin responses with status > 399 are stored as well
    #[serde(default = "default_store_error_responses")]
    pub store_error_responses: bool,
    #[serde(default)]
    pub memory: MemoryCacheConfig,
    #[serde(default)]
    pub redis: RedisCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            max_age_seconds: default_max_age_seconds(),
            store_error_responses: default_store_error_responses(),
            memory: MemoryCacheConfig::default(),
            redis: RedisCacheConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Value of the `cache-control` header written on fetched responses
    pub fn cache_control_value(&self) -> String {
        format!("public, max-age={}", self.max_age_seconds)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_age_seconds == 0 {
            return Err("cache.max_age_seconds must be greater than 0".to_string());
        }
        match self.backend {
            CacheBackend::Memory => self.memory.validate(),
            CacheBackend::Redis => self.redis.validate(),
            CacheBackend::Disabled => Ok(()),
        }
    }
}

fn default_max_item_size_mb() -> u64 {
    DEFAULT_MAX_ITEM_SIZE_MB
}

fn default_max_capacity_mb() -> u64 {
    DEFAULT_MAX_CACHE_SIZE_MB
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    #[serde(default = "default_max_capacity_mb")]
    pub max_capacity_mb: u64,
    #[serde(default = "default_max_item_size_mb")]
    pub max_item_size_mb: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity_mb: default_max_capacity_mb(),
            max_item_size_mb: default_max_item_size_mb(),
        }
    }
}

impl MemoryCacheConfig {
    /// Convert max_capacity_mb to bytes
    pub fn max_capacity_bytes(&self) -> u64 {
        self.max_capacity_mb * 1024 * 1024
    }

    /// Convert max_item_size_mb to bytes
    pub fn max_item_size_bytes(&self) -> u64 {
        self.max_item_size_mb * 1024 * 1024
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_capacity_mb == 0 {
            return Err("cache.memory.max_capacity_mb must be greater than 0".to_string());
        }
        if self.max_item_size_mb > self.max_capacity_mb {
            return Err(format!(
                "max_item_size_mb ({}) cannot be greater than max_capacity_mb ({})",
                self.max_item_size_mb, self.max_capacity_mb
            ));
        }
        Ok(())
    }
}

fn default_redis_key_prefix() -> String {
    DEFAULT_REDIS_KEY_PREFIX.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl RedisCacheConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.url.as_deref() {
            None | Some("") => {
                Err("cache.redis.url is required when cache.backend is 'redis'".to_string())
            }
            Some(url) if !url.starts_with("redis://") && !url.starts_with("rediss://") => {
                Err(format!("cache.redis.url '{}' must use redis:// or rediss://", url))
            }
            Some(_) => Ok(()),
        }
    }
}
