// Cache-aside fetcher
//
// lookup -> (miss) translate -> origin fetch -> header rewrite -> detached store
//
// Origin responses with error statuses are ordinary results here; turning them
// into sanitized client responses is the dispatcher's job.

use futures::FutureExt;
use std::sync::Arc;
use std::time::Instant;

use crate::background::BackgroundExecutor;
use crate::cache::{CacheEntry, CacheKey, ResponseCache};
use crate::config::Config;
use crate::error::GatewayError;
use crate::metrics::Metrics;
use crate::origin::{is_hop_by_hop, outbound_headers, Origin, OriginError};
use crate::transform::{ImageRequest, Translator};

/// Where a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Answered before the cache was consulted
    None,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::None => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub entry: CacheEntry,
    pub cache_status: CacheStatus,
}

/// Header values written on every fetched response
#[derive(Debug, Clone)]
pub struct RewriteRules {
    pub cache_control: String,
    pub vary: &'static str,
}

impl RewriteRules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_control: config.cache.cache_control_value(),
            vary: if config.referer_policy_enabled() {
                "Accept, Referer"
            } else {
                "Accept"
            },
        }
    }

    /// Drop hop-by-hop, content-length and existing caching headers, then
    /// append `cache-control` and `vary`
    pub fn apply(&self, headers: Vec<(String, String)>) -> Vec<(String, String)> {
        let mut rewritten: Vec<(String, String)> = headers
            .into_iter()
            .filter(|(name, _)| {
                !is_hop_by_hop(name)
                    && !name.eq_ignore_ascii_case("content-length")
                    && !name.eq_ignore_ascii_case("cache-control")
                    && !name.eq_ignore_ascii_case("vary")
            })
            .collect();
        rewritten.push(("cache-control".to_string(), self.cache_control.clone()));
        rewritten.push(("vary".to_string(), self.vary.to_string()));
        rewritten
    }
}

pub struct CacheAsideFetcher {
    cache: Arc<dyn ResponseCache>,
    origin: Arc<dyn Origin>,
    translator: Arc<Translator>,
    background: Arc<dyn BackgroundExecutor>,
    metrics: Arc<Metrics>,
    rules: RewriteRules,
    user_agent: String,
    store_error_responses: bool,
}

impl CacheAsideFetcher {
    pub fn new(
        config: &Config,
        translator: Arc<Translator>,
        cache: Arc<dyn ResponseCache>,
        origin: Arc<dyn Origin>,
        background: Arc<dyn BackgroundExecutor>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            cache,
            origin,
            translator,
            background,
            metrics,
            rules: RewriteRules::from_config(config),
            user_agent: config.origin.user_agent.clone(),
            store_error_responses: config.cache.store_error_responses,
        }
    }

    pub async fn fetch(
        &self,
        request: &ImageRequest,
        request_id: &str,
    ) -> Result<FetchOutcome, GatewayError> {
        let key = request.cache_key();

        match self.cache.get(&key).await {
            Ok(Some(entry)) => {
                self.metrics.record_cache_lookup("hit");
                tracing::debug!(request_id = %request_id, key = %key, "Cache hit");
                return Ok(FetchOutcome {
                    entry,
                    cache_status: CacheStatus::Hit,
                });
            }
            Ok(None) => {
                self.metrics.record_cache_lookup("miss");
            }
            Err(e) => {
                self.metrics.record_cache_lookup("error");
                tracing::warn!(
                    request_id = %request_id,
                    key = %key,
                    backend = self.cache.name(),
                    error = %e,
                    "Cache lookup failed, treating as miss"
                );
            }
        }

        let origin_request = self
            .translator
            .translate(request)
            .map_err(|e| GatewayError::Internal(format!("translation failed after validation: {}", e)))?;
        let url = origin_request.url();
        let headers = outbound_headers(request.headers(), &self.user_agent);

        let started = Instant::now();
        let response = match self.origin.fetch(&url, &headers).await {
            Ok(response) => response,
            Err(e) => {
                self.metrics
                    .record_origin_error(origin_error_kind(&e), started.elapsed().as_secs_f64());
                return Err(GatewayError::Internal(format!("origin fetch {} failed: {}", url, e)));
            }
        };
        self.metrics
            .record_origin_fetch(response.status, started.elapsed().as_secs_f64());
        tracing::debug!(
            request_id = %request_id,
            origin_url = %url,
            status = response.status,
            "Fetched from origin"
        );

        let entry = CacheEntry::new(
            response.status,
            self.rules.apply(response.headers),
            response.body,
        );
        self.store_detached(key, entry.clone());

        Ok(FetchOutcome {
            entry,
            cache_status: CacheStatus::Miss,
        })
    }

    fn store_detached(&self, key: CacheKey, entry: CacheEntry) {
        if !is_full_response(&entry) || (entry.status > 399 && !self.store_error_responses) {
            self.metrics.record_cache_store("skipped");
            return;
        }

        let cache = self.cache.clone();
        let metrics = self.metrics.clone();
        self.background.spawn(
            "cache_store",
            async move {
                match cache.put(key.clone(), entry).await {
                    Ok(()) => metrics.record_cache_store("ok"),
                    Err(e) => {
                        metrics.record_cache_store("error");
                        tracing::warn!(
                            key = %key,
                            backend = cache.name(),
                            error = %e,
                            error_kind = e.kind(),
                            "Cache store failed"
                        );
                    }
                }
            }
            .boxed(),
        );
    }
}

/// Whether a response can stand in for any later plain GET of the same URL
///
/// Informational, partial and not-modified responses never can; other
/// redirects only when they carry a body.
pub fn is_full_response(entry: &CacheEntry) -> bool {
    match entry.status {
        100..=199 | 206 | 304 => false,
        300..=399 => !entry.body.is_empty(),
        _ => true,
    }
}

fn origin_error_kind(e: &OriginError) -> &'static str {
    match e {
        OriginError::Timeout(_) => "timeout",
        OriginError::Connect(_) => "connect",
        OriginError::Transport(_) => "transport",
        OriginError::Body(_) => "body",
        OriginError::Client(_) => "client",
    }
}
