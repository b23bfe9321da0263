// Test doubles shared by the pipeline unit tests

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use kasasagi::background::TokioBackground;
use kasasagi::cache::{CacheEntry, CacheError, CacheKey, ResponseCache};
use kasasagi::config::Config;
use kasasagi::metrics::Metrics;
use kasasagi::origin::{Origin, OriginError, OriginResponse};
use kasasagi::pipeline::Dispatcher;
use kasasagi::transform::ImageRequest;

/// In-memory cache that counts calls and can be told to fail
#[derive(Default)]
pub struct CountingCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
    pub fail_get: bool,
    pub fail_put: bool,
}

impl CountingCache {
    pub fn failing_get() -> Self {
        Self {
            fail_get: true,
            ..Default::default()
        }
    }

    pub fn failing_put() -> Self {
        Self {
            fail_put: true,
            ..Default::default()
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn stored(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(&key.to_string()).cloned()
    }

    pub fn insert(&self, key: &CacheKey, entry: CacheEntry) {
        self.entries.lock().unwrap().insert(key.to_string(), entry);
    }
}

#[async_trait]
impl ResponseCache for CountingCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_get {
            return Err(CacheError::RedisConnectionFailed("connection refused".to_string()));
        }
        Ok(self.entries.lock().unwrap().get(&key.to_string()).cloned())
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(CacheError::RedisError("READONLY".to_string()));
        }
        self.entries.lock().unwrap().insert(key.to_string(), entry);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Origin that answers every fetch with a canned response and records calls
pub struct CountingOrigin {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
    fail: bool,
    /// Answer `if-none-match` with 304 and `range` with 206, like a real CDN
    honor_conditionals: bool,
    pub calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl CountingOrigin {
    pub fn ok(body: &'static [u8]) -> Self {
        Self::with_status(
            200,
            vec![
                ("content-type".to_string(), "image/avif".to_string()),
                ("cache-control".to_string(), "private, max-age=60".to_string()),
                ("connection".to_string(), "keep-alive".to_string()),
            ],
            body,
        )
    }

    pub fn with_status(
        status: u16,
        headers: Vec<(String, String)>,
        body: &'static [u8],
    ) -> Self {
        Self {
            status,
            headers,
            body: Bytes::from_static(body),
            fail: false,
            honor_conditionals: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn revalidating(body: &'static [u8]) -> Self {
        Self {
            honor_conditionals: true,
            ..Self::ok(body)
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail: true,
            ..Self::ok(b"")
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_url(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(url, _)| url.clone())
    }

    pub fn last_headers(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, headers)| headers.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Origin for CountingOrigin {
    async fn fetch(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<OriginResponse, OriginError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), headers.to_vec()));
        if self.fail {
            return Err(OriginError::Connect("connection refused".to_string()));
        }
        if self.honor_conditionals {
            let has = |name: &str| headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name));
            if has("if-none-match") {
                return Ok(OriginResponse {
                    status: 304,
                    headers: vec![("etag".to_string(), "\"v1\"".to_string())],
                    body: Bytes::new(),
                });
            }
            if has("range") {
                return Ok(OriginResponse {
                    status: 206,
                    headers: self.headers.clone(),
                    body: self.body.slice(..self.body.len().min(2)),
                });
            }
        }
        Ok(OriginResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
        })
    }
}

/// Dispatcher wired to the given doubles, plus the handles a test inspects
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub cache: Arc<CountingCache>,
    pub origin: Arc<CountingOrigin>,
    pub background: TokioBackground,
    pub metrics: Arc<Metrics>,
}

impl Harness {
    pub fn new(config: Config, cache: CountingCache, origin: CountingOrigin) -> Self {
        let cache = Arc::new(cache);
        let origin = Arc::new(origin);
        let background = TokioBackground::new();
        let metrics = Arc::new(Metrics::new().unwrap());
        let dispatcher = Dispatcher::new(
            &config,
            cache.clone(),
            origin.clone(),
            Arc::new(background.clone()),
            metrics.clone(),
        );
        Self {
            dispatcher,
            cache,
            origin,
            background,
            metrics,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            Config::for_cloud("slovyagin"),
            CountingCache::default(),
            CountingOrigin::ok(b"avif-bytes"),
        )
    }
}

pub fn get(target: &str) -> ImageRequest {
    request("GET", target, &[])
}

pub fn request(method: &str, target: &str, headers: &[(&str, &str)]) -> ImageRequest {
    ImageRequest::new(
        method,
        "img.example.com",
        target,
        headers
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
    )
}

pub fn referer_config(origins: &[&str]) -> Config {
    let mut config = Config::for_cloud("slovyagin");
    config.access.referer.enabled = true;
    config.access.referer.allowed_origins = origins.iter().map(|o| o.to_string()).collect();
    config
}
