//! Cache key and entry types

use bytes::Bytes;
use std::fmt;
use std::time::SystemTime;

/// Inbound request identity
///
/// Built from the request exactly as received: query parameters are not
/// reordered or decoded, so `?s=700&x=1` and `?x=1&s=700` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: String,
    pub host: String,
    /// Path plus `?query` when the request had one
    pub path_and_query: String,
}

impl CacheKey {
    pub fn new(
        method: impl Into<String>,
        host: impl Into<String>,
        path_and_query: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            host: host.into(),
            path_and_query: path_and_query.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.method, self.host, self.path_and_query)
    }
}

/// A stored response, already header-rewritten
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub status: u16,
    /// Header list in the order it will be written back
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub created_at: SystemTime,
}

impl CacheEntry {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            created_at: SystemTime::now(),
        }
    }

    /// Approximate memory footprint used for weighing and size limits
    pub fn size_bytes(&self) -> usize {
        let header_bytes: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.len() + value.len())
            .sum();
        self.body.len() + header_bytes
    }

    /// First value of header `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
