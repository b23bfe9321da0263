// Access policy outcomes observed through the dispatcher
// Rejected requests must never touch the cache or the origin.

use bytes::Bytes;
use rstest::rstest;

use kasasagi::config::{Config, PolicyKind};
use kasasagi::fetcher::CacheStatus;

use super::support::{get, referer_config, request, CountingCache, CountingOrigin, Harness};

fn assert_untouched(h: &Harness) {
    assert_eq!(h.cache.gets(), 0);
    assert_eq!(h.cache.puts(), 0);
    assert_eq!(h.origin.call_count(), 0);
}

#[rstest]
#[case("/cat.jpg")]
#[case("/cat.jpg?s=5000")]
#[case("/cat.jpg?s=")]
#[case("/cat.jpg?size=700")]
#[tokio::test]
async fn test_invalid_size_is_unprocessable(#[case] target: &str) {
    let h = Harness::with_defaults();

    let response = h.dispatcher.handle(&get(target), "req-1").await;

    assert_eq!(response.status, 422);
    assert_eq!(response.body, Bytes::from_static(b"Unprocessable Entity"));
    assert_eq!(response.cache_status, CacheStatus::None);
    assert_untouched(&h);
    assert_eq!(h.metrics.get_policy_rejection_count("size_validation"), 1);
}

#[rstest]
#[case("POST")]
#[case("PUT")]
#[case("DELETE")]
#[case("HEAD")]
#[tokio::test]
async fn test_non_get_is_not_allowed(#[case] method: &str) {
    let h = Harness::with_defaults();

    let response = h
        .dispatcher
        .handle(&request(method, "/cat.jpg?s=700", &[]), "req-1")
        .await;

    assert_eq!(response.status, 405);
    assert_eq!(response.body, Bytes::from_static(b"Method not allowed"));
    assert_untouched(&h);
}

#[tokio::test]
async fn test_method_is_checked_before_referer_and_size() {
    let h = Harness::new(
        referer_config(&["https://slovyagin.com"]),
        CountingCache::default(),
        CountingOrigin::ok(b"avif-bytes"),
    );

    let response = h
        .dispatcher
        .handle(&request("POST", "/cat.jpg", &[]), "req-1")
        .await;

    assert_eq!(response.status, 405);
}

#[tokio::test]
async fn test_referer_is_checked_before_size() {
    let h = Harness::new(
        referer_config(&["https://slovyagin.com"]),
        CountingCache::default(),
        CountingOrigin::ok(b"avif-bytes"),
    );

    let response = h.dispatcher.handle(&get("/cat.jpg?s=5000"), "req-1").await;

    assert_eq!(response.status, 403);
    assert_eq!(response.body, Bytes::from_static(b"Forbidden"));
    assert_untouched(&h);
}

#[rstest]
#[case("https://slovyagin.com", 200)]
#[case("https://slovyagin.com/", 200)]
#[case("https://slovyagin.com/photos/cat", 200)]
#[case("https://www.slovyagin.com/", 403)]
#[case("http://slovyagin.com/", 403)]
#[case("https://evil.example/", 403)]
#[tokio::test]
async fn test_referer_whitelist(#[case] referer: &str, #[case] expected: u16) {
    let h = Harness::new(
        referer_config(&["https://slovyagin.com"]),
        CountingCache::default(),
        CountingOrigin::ok(b"avif-bytes"),
    );

    let response = h
        .dispatcher
        .handle(&request("GET", "/cat.jpg?s=700", &[("referer", referer)]), "req-1")
        .await;

    assert_eq!(response.status, expected);
}

#[tokio::test]
async fn test_missing_referer_is_forbidden_when_enabled() {
    let h = Harness::new(
        referer_config(&["https://slovyagin.com"]),
        CountingCache::default(),
        CountingOrigin::ok(b"avif-bytes"),
    );

    let response = h.dispatcher.handle(&get("/cat.jpg?s=700"), "req-1").await;

    assert_eq!(response.status, 403);
    assert_untouched(&h);
    assert_eq!(h.metrics.get_policy_rejection_count("hotlink_rejected"), 1);
}

#[tokio::test]
async fn test_dimension_policy_accepts_any_dimensions() {
    let mut config = Config::for_cloud("slovyagin");
    config.transform.policy = PolicyKind::Dimensions;
    let h = Harness::new(config, CountingCache::default(), CountingOrigin::ok(b"avif-bytes"));

    let response = h.dispatcher.handle(&get("/cat.jpg?w=640&h=&q=1"), "req-1").await;

    assert_eq!(response.status, 200);
    assert_eq!(
        h.origin.last_url().as_deref(),
        Some("https://res.cloudinary.com/slovyagin/image/upload/c_fit,q_auto,w_640/v1/photos/cat.avif?q=1")
    );
}

#[test]
fn test_rejection_needs_no_runtime_spawns() {
    let h = Harness::with_defaults();

    let response = tokio_test::block_on(h.dispatcher.handle(&get("/cat.jpg?s=1"), "req-1"));

    assert_eq!(response.status, 422);
    assert_eq!(h.background.in_flight(), 0);
}
