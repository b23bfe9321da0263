//! Cache trait definition
//!
//! `ResponseCache` is the seam between the cache-aside fetcher and the
//! storage backend. Writers race freely; the last `put` for a key wins.

use async_trait::async_trait;

use super::entry::{CacheEntry, CacheKey};
use super::error::CacheError;

#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Look up a stored response
    /// Returns None if the key is not found or the entry has expired
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Store a response, overwriting any existing entry for the key
    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError>;

    /// Backend name used in logs and metrics
    fn name(&self) -> &'static str;
}
