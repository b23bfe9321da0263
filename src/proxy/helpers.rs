//! Proxy utility functions.
//!
//! Conversions from Pingora request headers into pipeline types, plus
//! client IP detection for access logs.

use pingora_http::RequestHeader;
use pingora_proxy::Session;

use crate::transform::ImageRequest;

/// Extract headers in arrival order. Headers with non-UTF8 values are skipped.
pub fn extract_headers(req: &RequestHeader) -> Vec<(String, String)> {
    req.headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Host header, falling back to the URI authority (HTTP/2, absolute-form)
pub fn request_host(req: &RequestHeader) -> String {
    req.headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Build the pipeline request from a Pingora request header
pub fn image_request(req: &RequestHeader) -> ImageRequest {
    let target = req
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.uri.path());
    ImageRequest::new(
        req.method.as_str(),
        request_host(req),
        target,
        extract_headers(req),
    )
}

/// Extract client IP address from session (X-Forwarded-For aware).
///
/// The header can contain multiple IPs: `"client, proxy1, proxy2"`.
/// The first IP is the original client, which is what we return.
pub fn get_client_ip(session: &Session) -> String {
    if let Some(forwarded_for) = session
        .req_header()
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(client_ip) = forwarded_for.split(',').next() {
            return client_ip.trim().to_string();
        }
    }

    session
        .client_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
