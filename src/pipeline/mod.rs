// Request pipeline - dispatcher and response normalizer
//
// Every inbound image request yields exactly one ImageResponse:
//
//   access policy (method, referer, size) -> cache-aside fetcher -> normalize
//
// Policy failures are answered before any cache or network work. Origin
// statuses above 399 reach the client as a bare status text with no headers
// from the origin. Internal faults are logged with the request id and become
// a generic 500.

use bytes::Bytes;
use std::sync::Arc;

use crate::access::AccessPolicy;
use crate::background::BackgroundExecutor;
use crate::cache::{CacheEntry, ResponseCache};
use crate::config::Config;
use crate::error::GatewayError;
use crate::fetcher::{CacheAsideFetcher, CacheStatus};
use crate::metrics::Metrics;
use crate::origin::Origin;
use crate::transform::{ImageRequest, Translator};

pub mod context;

pub use context::RequestContext;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Final response handed to the hosting adapter
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub cache_status: CacheStatus,
}

impl ImageResponse {
    /// Plain-text response carrying only a content type
    pub fn text(status: u16, body: &str, cache_status: CacheStatus) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), TEXT_PLAIN.to_string())],
            body: Bytes::copy_from_slice(body.as_bytes()),
            cache_status,
        }
    }

    pub fn from_error(error: &GatewayError) -> Self {
        Self::text(error.status_code(), error.public_message(), CacheStatus::None)
    }

    /// Pass successful entries through; replace error entries with their status text
    pub fn from_entry(entry: CacheEntry, cache_status: CacheStatus) -> Self {
        if entry.status > 399 {
            return Self::text(entry.status, status_text(entry.status), cache_status);
        }
        Self {
            status: entry.status,
            headers: entry.headers,
            body: entry.body,
            cache_status,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Canonical reason phrase, empty for unregistered codes
pub fn status_text(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

pub struct Dispatcher {
    policy: AccessPolicy,
    fetcher: CacheAsideFetcher,
    metrics: Arc<Metrics>,
}

impl Dispatcher {
    pub fn new(
        config: &Config,
        cache: Arc<dyn ResponseCache>,
        origin: Arc<dyn Origin>,
        background: Arc<dyn BackgroundExecutor>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let translator = Arc::new(Translator::from_config(config));
        let policy = AccessPolicy::new(&config.access, translator.clone());
        let fetcher = CacheAsideFetcher::new(
            config,
            translator,
            cache,
            origin,
            background,
            metrics.clone(),
        );
        Self {
            policy,
            fetcher,
            metrics,
        }
    }

    pub async fn handle(&self, request: &ImageRequest, request_id: &str) -> ImageResponse {
        if let Err(e) = self.policy.check(request) {
            self.metrics.record_policy_rejection(e.kind());
            tracing::debug!(
                request_id = %request_id,
                method = %request.method(),
                path = %request.path(),
                error = %e,
                "Request rejected by access policy"
            );
            return ImageResponse::from_error(&e);
        }

        match self.fetcher.fetch(request, request_id).await {
            Ok(outcome) => ImageResponse::from_entry(outcome.entry, outcome.cache_status),
            Err(e) => {
                if e.is_internal() {
                    tracing::error!(
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.path(),
                        error = %e,
                        "Internal error while serving image"
                    );
                }
                ImageResponse::from_error(&e)
            }
        }
    }
}
