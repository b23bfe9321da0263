// HttpOrigin against a local stub origin

use bytes::Bytes;
use std::time::Duration;

use kasasagi::config::OriginConfig;
use kasasagi::origin::{outbound_headers, HttpOrigin, Origin, OriginError};

use super::stub_origin::{StubOrigin, StubResponse};

fn client(timeout_seconds: u64) -> HttpOrigin {
    let mut config = OriginConfig::for_cloud("slovyagin");
    config.timeout_seconds = timeout_seconds;
    HttpOrigin::new(&config).unwrap()
}

fn inbound(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_fetch_returns_status_headers_and_body() {
    let stub = StubOrigin::start(StubResponse::avif(b"avif-bytes")).await;

    let response = client(5)
        .fetch(&format!("{}/cat.avif", stub.base_url), &[])
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, Bytes::from_static(b"avif-bytes"));
    assert!(response
        .headers
        .contains(&("content-type".to_string(), "image/avif".to_string())));
    assert!(response
        .headers
        .contains(&("etag".to_string(), "\"v1\"".to_string())));
}

#[tokio::test]
async fn test_fetch_forwards_headers_with_configured_user_agent() {
    let stub = StubOrigin::start(StubResponse::avif(b"x")).await;
    let headers = outbound_headers(
        &inbound(&[
            ("host", "img.example.com"),
            ("accept", "image/avif,image/webp"),
            ("user-agent", "Mozilla/5.0"),
            ("x-custom", "kept"),
        ]),
        "kasasagi-test/1.0",
    );

    client(5)
        .fetch(&format!("{}/photos/cat.avif?a=1", stub.base_url), &headers)
        .await
        .unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.request_line, "GET /photos/cat.avif?a=1 HTTP/1.1");
    assert_eq!(request.header("accept"), Some("image/avif,image/webp"));
    assert_eq!(request.header("x-custom"), Some("kept"));
    assert_eq!(request.header("user-agent"), Some("kasasagi-test/1.0"));
    assert_eq!(request.header_count("user-agent"), 1);
    assert_ne!(request.header("host"), Some("img.example.com"));
}

#[tokio::test]
async fn test_error_status_is_a_successful_fetch() {
    let stub = StubOrigin::start(StubResponse {
        status_line: "HTTP/1.1 404 Not Found",
        headers: vec![("X-Cld-Error", "Resource not found")],
        body: b"missing",
        delay: None,
    })
    .await;

    let response = client(5)
        .fetch(&format!("{}/missing.avif", stub.base_url), &[])
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.body, Bytes::from_static(b"missing"));
}

#[tokio::test]
async fn test_slow_origin_times_out() {
    let stub = StubOrigin::start(StubResponse {
        delay: Some(Duration::from_secs(3)),
        ..StubResponse::avif(b"late")
    })
    .await;

    let result = client(1)
        .fetch(&format!("{}/cat.avif", stub.base_url), &[])
        .await;

    assert!(matches!(result, Err(OriginError::Timeout(_))));
}
