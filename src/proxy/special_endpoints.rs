//! Special endpoint handlers for the proxy.
//!
//! Built-in endpoints answered before the image pipeline:
//! - health: JSON status, uptime and version
//! - metrics: Prometheus text export
//!
//! Functions return `EndpointResponse` instead of writing directly to the
//! session, which keeps response generation testable.

use std::time::Instant;

use crate::config::ServerConfig;
use crate::metrics::Metrics;

/// Which built-in endpoint a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinEndpoint {
    Health,
    Metrics,
}

impl BuiltinEndpoint {
    /// Match a GET request path against the configured endpoint paths
    pub fn route(server: &ServerConfig, method: &str, path: &str) -> Option<Self> {
        if method != "GET" {
            return None;
        }
        if server.health_path.as_deref() == Some(path) {
            Some(BuiltinEndpoint::Health)
        } else if server.metrics_path.as_deref() == Some(path) {
            Some(BuiltinEndpoint::Metrics)
        } else {
            None
        }
    }
}

/// Response from a special endpoint handler.
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl EndpointResponse {
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    pub fn prometheus(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/plain; version=0.0.4",
            body,
        }
    }
}

/// Generate response for the health endpoint.
pub fn handle_health(start_time: Instant, cache_backend: &str) -> EndpointResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
        "cache_backend": cache_backend,
    })
    .to_string();

    EndpointResponse::json(200, body)
}

/// Generate response for the metrics endpoint.
pub fn handle_metrics(metrics: &Metrics) -> EndpointResponse {
    match metrics.export_prometheus() {
        Ok(output) => EndpointResponse::prometheus(output),
        Err(e) => {
            tracing::error!(error = %e, "Failed to export metrics");
            EndpointResponse {
                status: 500,
                content_type: "text/plain; charset=utf-8",
                body: "Internal Server Error".to_string(),
            }
        }
    }
}
