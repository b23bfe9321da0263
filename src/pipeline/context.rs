// Per-request context carried through the proxy hooks

use std::time::Instant;
use uuid::Uuid;

use crate::fetcher::CacheStatus;

/// Request context that holds everything the logging hook needs once the
/// response has been written
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    started: Instant,
    cache_status: CacheStatus,
}

impl RequestContext {
    /// Create a new RequestContext with a fresh UUID v4 request id
    pub fn new(method: String, path: String) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            path,
            started: Instant::now(),
            cache_status: CacheStatus::None,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fill in request details once the request header has been read
    pub fn set_request(&mut self, method: &str, path: &str) {
        self.method = method.to_string();
        self.path = path.to_string();
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache_status
    }

    pub fn set_cache_status(&mut self, status: CacheStatus) {
        self.cache_status = status;
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
