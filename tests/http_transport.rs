//! HTTP behaviour of the fetch layer against a local mock server.

use std::sync::Arc;
use std::time::Duration;

use newsroll::models::RawItem;
use newsroll::{AppError, Config, FileFetcher, HttpTransport, NewsStore, Transport, Unavailable};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        base_url: format!("{}/api", server.uri()),
        request_timeout_ms: 2_000,
        ..Config::default()
    }
}

#[tokio::test]
async fn fetches_resource_at_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news_sources.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "title": "Wire" }])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let value = transport.get_json("news_sources").await.unwrap();
    assert_eq!(value[0]["title"], "Wire");
}

#[tokio::test]
async fn not_found_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news_raw.900.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = transport.get_json("news_raw.900").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        AppError::ResourceUnavailable { resource, reason } => {
            assert_eq!(resource, "news_raw.900");
            assert_eq!(reason, Unavailable::Status(404));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn server_error_is_not_a_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/meta.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = transport.get_json("meta").await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(
        err,
        AppError::ResourceUnavailable { reason: Unavailable::Status(503), .. }
    ));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/meta.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(1_500)),
        )
        .mount(&server)
        .await;

    let config = Config {
        request_timeout_ms: 200,
        ..config_for(&server)
    };
    let transport = HttpTransport::new(&config).unwrap();
    let err = transport.get_json("meta").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::ResourceUnavailable { reason: Unavailable::Timeout, .. }
    ));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = transport.get_json("tags").await.unwrap_err();
    assert!(matches!(err, AppError::Decode { .. }));
}

#[tokio::test]
async fn memoized_fetch_makes_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let fetcher = FileFetcher::new(Arc::new(transport));
    fetcher.fetch_memoized("tags").await.unwrap();
    fetcher.fetch_memoized("tags").await.unwrap();
}

#[tokio::test]
async fn store_over_http_orders_and_absorbs_missing_batches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news_raw.0.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 10, "title": "ten" },
            { "id": 30, "title": "thirty" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/news_raw.100.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 120, "title": "one twenty" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/news_raw.500.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let store = NewsStore::from_config(&config_for(&server)).unwrap();
    let items: Vec<RawItem> = store.fetch_many_by_ids(&[30, 510, 10, 120]).await;
    let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![30, 10, 120]);

    let missing: Option<RawItem> = store.fetch_by_id(505).await;
    assert!(missing.is_none());
}

#[tokio::test]
async fn recent_over_http_uses_meta_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/meta.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generated_at": "2024-06-01T00:00:00Z",
            "tables": { "news_raw": { "latest_id": 207 } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let batch: Vec<_> = (200..=209).map(|id| json!({ "id": id, "title": "t" })).collect();
    Mock::given(method("GET"))
        .and(path("/api/news_raw.200.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch))
        .expect(1)
        .mount(&server)
        .await;

    let store = NewsStore::from_config(&config_for(&server)).unwrap();
    let items: Vec<RawItem> = store.fetch_recent(5).await.unwrap();
    let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![207, 206, 205, 204, 203]);
}

#[tokio::test]
async fn missing_meta_is_fatal_for_bounded_reads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/meta.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = NewsStore::from_config(&config_for(&server)).unwrap();
    let err = store.fetch_recent::<RawItem>(5).await.unwrap_err();
    match err {
        AppError::MetadataMissing(inner) => assert!(inner.is_not_found()),
        other => panic!("unexpected error: {other}"),
    }
}
