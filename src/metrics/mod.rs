// Metrics module - Prometheus-compatible metrics tracking
//
// Each Metrics instance owns its own registry so independent pipelines (and
// tests) never collide on metric registration.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

pub struct Metrics {
    registry: Registry,

    /// Responses by method and status code
    requests_total: IntCounterVec,
    request_duration: HistogramVec,

    /// Cache lookups by result (hit, miss, error)
    cache_lookups: IntCounterVec,
    /// Detached cache stores by result (ok, error, skipped)
    cache_stores: IntCounterVec,

    /// Completed origin fetches by status class (2xx, 4xx, ...)
    origin_fetches: IntCounterVec,
    origin_errors: IntCounterVec,
    origin_latency: HistogramVec,

    /// Requests refused before the fetcher ran, by error kind
    policy_rejections: IntCounterVec,

    background_in_flight: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("kasasagi".to_string()), None)?;

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total responses by method and status"),
            &["method", "status"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Time from request to response in seconds",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["cache"],
        )?;
        let cache_lookups = IntCounterVec::new(
            Opts::new("cache_lookups_total", "Cache lookups by result"),
            &["result"],
        )?;
        let cache_stores = IntCounterVec::new(
            Opts::new("cache_stores_total", "Background cache stores by result"),
            &["result"],
        )?;
        let origin_fetches = IntCounterVec::new(
            Opts::new("origin_fetches_total", "Completed origin fetches by status class"),
            &["class"],
        )?;
        let origin_errors = IntCounterVec::new(
            Opts::new("origin_errors_total", "Origin fetches that failed in transport"),
            &["kind"],
        )?;
        let origin_latency = HistogramVec::new(
            HistogramOpts::new("origin_fetch_duration_seconds", "Origin fetch latency in seconds")
                .buckets(LATENCY_BUCKETS.to_vec()),
            &["outcome"],
        )?;
        let policy_rejections = IntCounterVec::new(
            Opts::new("policy_rejections_total", "Requests rejected by access policy"),
            &["kind"],
        )?;
        let background_in_flight = IntGauge::new(
            "background_tasks_in_flight",
            "Detached background tasks not yet finished",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(cache_lookups.clone()))?;
        registry.register(Box::new(cache_stores.clone()))?;
        registry.register(Box::new(origin_fetches.clone()))?;
        registry.register(Box::new(origin_errors.clone()))?;
        registry.register(Box::new(origin_latency.clone()))?;
        registry.register(Box::new(policy_rejections.clone()))?;
        registry.register(Box::new(background_in_flight.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            cache_lookups,
            cache_stores,
            origin_fetches,
            origin_errors,
            origin_latency,
            policy_rejections,
            background_in_flight,
        })
    }

    pub fn record_request(&self, method: &str, status: u16, cache_status: &str, duration_secs: f64) {
        self.requests_total
            .with_label_values(&[method, &status.to_string()])
            .inc();
        self.request_duration
            .with_label_values(&[cache_status])
            .observe(duration_secs);
    }

    pub fn record_cache_lookup(&self, result: &str) {
        self.cache_lookups.with_label_values(&[result]).inc();
    }

    pub fn record_cache_store(&self, result: &str) {
        self.cache_stores.with_label_values(&[result]).inc();
    }

    pub fn record_origin_fetch(&self, status: u16, duration_secs: f64) {
        let class = format!("{}xx", status / 100);
        self.origin_fetches.with_label_values(&[&class]).inc();
        self.origin_latency
            .with_label_values(&["ok"])
            .observe(duration_secs);
    }

    pub fn record_origin_error(&self, kind: &str, duration_secs: f64) {
        self.origin_errors.with_label_values(&[kind]).inc();
        self.origin_latency
            .with_label_values(&["error"])
            .observe(duration_secs);
    }

    pub fn record_policy_rejection(&self, kind: &str) {
        self.policy_rejections.with_label_values(&[kind]).inc();
    }

    pub fn set_background_in_flight(&self, count: usize) {
        self.background_in_flight
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn get_request_count(&self, method: &str, status: u16) -> u64 {
        self.requests_total
            .with_label_values(&[method, &status.to_string()])
            .get()
    }

    pub fn get_cache_lookup_count(&self, result: &str) -> u64 {
        self.cache_lookups.with_label_values(&[result]).get()
    }

    pub fn get_cache_store_count(&self, result: &str) -> u64 {
        self.cache_stores.with_label_values(&[result]).get()
    }

    pub fn get_origin_fetch_count(&self, class: &str) -> u64 {
        self.origin_fetches.with_label_values(&[class]).get()
    }

    pub fn get_origin_error_count(&self, kind: &str) -> u64 {
        self.origin_errors.with_label_values(&[kind]).get()
    }

    pub fn get_policy_rejection_count(&self, kind: &str) -> u64 {
        self.policy_rejections.with_label_values(&[kind]).get()
    }

    /// Export all metrics in Prometheus text format
    pub fn export_prometheus(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
