//! Transformation origin client
//!
//! The origin is an opaque HTTP service. Any status it returns, including
//! 4xx/5xx, is a successful fetch; only transport problems are errors.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

use crate::config::OriginConfig;

/// Headers that describe a single connection and are never forwarded
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Request headers that would make the origin answer with a partial or
/// not-modified response instead of the full image
const CONDITIONAL_HEADERS: &[&str] = &[
    "if-match",
    "if-modified-since",
    "if-none-match",
    "if-range",
    "if-unmodified-since",
    "range",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

pub fn is_conditional(name: &str) -> bool {
    CONDITIONAL_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// Inbound headers as sent to the origin
///
/// Drops `Host`, `Content-Length`, hop-by-hop, conditional and range headers
/// and any inbound `User-Agent`, then appends the configured user agent.
pub fn outbound_headers(inbound: &[(String, String)], user_agent: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = inbound
        .iter()
        .filter(|(name, _)| {
            !name.eq_ignore_ascii_case("host")
                && !name.eq_ignore_ascii_case("content-length")
                && !name.eq_ignore_ascii_case("user-agent")
                && !is_hop_by_hop(name)
                && !is_conditional(name)
        })
        .cloned()
        .collect();
    headers.push(("user-agent".to_string(), user_agent.to_string()));
    headers
}

#[derive(Debug, Error)]
pub enum OriginError {
    #[error("origin request timed out after {0:?}")]
    Timeout(Duration),

    #[error("origin connection failed: {0}")]
    Connect(String),

    #[error("origin request failed: {0}")]
    Transport(String),

    #[error("failed to read origin body: {0}")]
    Body(String),

    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Raw origin response, before header rewriting
#[derive(Debug, Clone)]
pub struct OriginResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

#[async_trait]
pub trait Origin: Send + Sync {
    /// Perform one GET against `url` with exactly `headers`
    async fn fetch(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<OriginResponse, OriginError>;
}

/// reqwest-backed origin client with a per-request timeout
pub struct HttpOrigin {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpOrigin {
    pub fn new(config: &OriginConfig) -> Result<Self, OriginError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OriginError::Client(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn fetch(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<OriginResponse, OriginError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            // Headers that do not survive re-encoding are dropped
            let Ok(name) = reqwest::header::HeaderName::from_bytes(name.as_bytes()) else {
                continue;
            };
            let Ok(value) = reqwest::header::HeaderValue::from_str(value) else {
                continue;
            };
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                OriginError::Timeout(self.timeout)
            } else {
                OriginError::Body(e.to_string())
            }
        })?;

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }
}

impl HttpOrigin {
    fn classify(&self, e: reqwest::Error) -> OriginError {
        if e.is_timeout() {
            OriginError::Timeout(self.timeout)
        } else if e.is_connect() {
            OriginError::Connect(e.to_string())
        } else {
            OriginError::Transport(e.to_string())
        }
    }
}
