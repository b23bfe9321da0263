//! Inbound image request

use super::query::QueryParams;
use crate::cache::CacheKey;

/// An inbound request as seen by the pipeline. Immutable once built.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    method: String,
    host: String,
    path: String,
    raw_query: Option<String>,
    query: QueryParams,
    headers: Vec<(String, String)>,
}

impl ImageRequest {
    /// Build from a request target such as `/cat.jpg?s=700`
    pub fn new(
        method: impl Into<String>,
        host: impl Into<String>,
        target: &str,
        headers: Vec<(String, String)>,
    ) -> Self {
        let (path, raw_query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        let query = raw_query
            .as_deref()
            .map(QueryParams::parse)
            .unwrap_or_default();

        Self {
            method: method.into(),
            host: host.into(),
            path,
            raw_query,
            query,
            headers,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Path plus `?query` exactly as received
    pub fn path_and_query(&self) -> String {
        match &self.raw_query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// First value of header `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn referer(&self) -> Option<&str> {
        self.header("referer")
    }

    /// Path with dot segments resolved and the leading `/` stripped,
    /// truncated at the first `.`
    pub fn image_id(&self) -> String {
        let normalized = remove_dot_segments(&self.path);
        let trimmed = normalized.strip_prefix('/').unwrap_or(&normalized);
        trimmed.split('.').next().unwrap_or(trimmed).to_string()
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.method.clone(), self.host.clone(), self.path_and_query())
    }
}

fn is_single_dot(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

fn is_double_dot(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}

/// Resolve `.` and `..` segments the way URL parsers normalize a path
fn remove_dot_segments(path: &str) -> String {
    let segments: Vec<&str> = path.strip_prefix('/').unwrap_or(path).split('/').collect();
    let last = segments.len().saturating_sub(1);
    let mut out: Vec<&str> = Vec::with_capacity(segments.len());

    for (i, &segment) in segments.iter().enumerate() {
        if is_double_dot(segment) {
            out.pop();
        } else if !is_single_dot(segment) {
            out.push(segment);
            continue;
        }
        // A trailing dot segment leaves the path ending in `/`
        if i == last {
            out.push("");
        }
    }
    format!("/{}", out.join("/"))
}
