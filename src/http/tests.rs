//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(uri: &str) -> HttpClientConfigBuilder {
    HttpClientConfig::builder()
        .base_url(uri)
        .backoff(Duration::from_millis(1), Duration::from_millis(10))
        .no_rate_limit()
}

async fn get(client: &HttpClient, url: &str) -> crate::error::Result<RawResponse> {
    client.get_with_config(url, RequestConfig::new()).await
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_attempts, 10);
    assert_eq!(config.backoff_factor, Duration::from_millis(300));
    assert_eq!(config.retry_statuses, vec![429, 500, 502, 503, 504]);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_none());
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://app.example.com/api/1.1/obj/")
        .bearer_token("secret")
        .timeout(Duration::from_secs(60))
        .max_attempts(5)
        .backoff(Duration::from_millis(200), Duration::from_secs(30))
        .build();

    assert_eq!(
        config.base_url.as_deref(),
        Some("https://app.example.com/api/1.1/obj/")
    );
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.backoff_factor, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(
        config.default_headers.get("Authorization"),
        Some(&"Bearer secret".to_string())
    );
    assert_eq!(
        config.default_headers.get("Content-Type"),
        Some(&"application/json".to_string())
    );
    assert!(config.user_agent.starts_with("bubble-extractor/"));
}

#[test]
fn test_request_config_keeps_query_order() {
    let config = RequestConfig::new()
        .query("cursor", "0")
        .query("limit", "100")
        .header("X-Request-Id", "abc123");

    assert_eq!(
        config.query,
        vec![
            ("cursor".to_string(), "0".to_string()),
            ("limit".to_string(), "100".to_string()),
        ]
    );
    assert_eq!(
        config.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
}

#[test]
fn test_raw_response_is_json() {
    assert!(RawResponse::new(200, Some("application/json; charset=utf-8"), "{}").is_json());
    assert!(RawResponse::new(200, Some("Application/JSON"), "{}").is_json());
    assert!(!RawResponse::new(200, Some("text/html"), "<html>").is_json());
    assert!(!RawResponse::new(200, None, "").is_json());
}

#[tokio::test]
async fn test_get_sends_auth_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1.1/obj/user"))
        .and(header("Authorization", "Bearer token-123"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = fast_config(&format!("{}/api/1.1/obj/", mock_server.uri()))
        .bearer_token("token-123")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let response = get(&client, "user").await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.attempts, 1);
    assert!(response.is_json());
    assert_eq!(response.body, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_get_with_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(query_param("cursor", "100"))
        .and(query_param("sort_field", "Modified Date"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(&mock_server.uri()).build()).unwrap();
    let response = client
        .get_with_config(
            "/user",
            RequestConfig::new()
                .query("cursor", "100")
                .query("sort_field", "Modified Date"),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_retry_on_503_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(&mock_server.uri()).build()).unwrap();
    let response = get(&client, "/flaky").await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.attempts, 3);
}

#[tokio::test]
async fn test_retry_on_502() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gateway"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gateway"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(&mock_server.uri()).build()).unwrap();
    let response = get(&client, "/gateway").await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.attempts, 2);
}

#[tokio::test]
async fn test_retry_exhaustion_returns_last_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("content-type", "application/json")
                .set_body_string(r#"{"body":{"message":"down"}}"#),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = fast_config(&mock_server.uri()).max_attempts(3).build();
    let client = HttpClient::with_config(config).unwrap();
    let response = get(&client, "/down").await.unwrap();

    assert_eq!(response.status, 503);
    assert_eq!(response.attempts, 3);
    assert!(response.body.contains("down"));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(&mock_server.uri()).build()).unwrap();
    let response = get(&client, "/missing").await.unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.attempts, 1);
    assert_eq!(response.body, "Not found");
}

#[tokio::test]
async fn test_retry_after_header_overrides_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    // Computed backoff would be 30s; the header says retry immediately
    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .backoff(Duration::from_secs(30), Duration::from_secs(30))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let response = tokio::time::timeout(Duration::from_secs(5), get(&client, "/limited"))
        .await
        .expect("retry-after was not honoured")
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.attempts, 2);
}

#[tokio::test]
async fn test_connection_failure_after_retries() {
    // Grab a free port and close it again so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = fast_config(&format!("http://127.0.0.1:{port}"))
        .max_attempts(2)
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = get(&client, "/user").await.unwrap_err();
    match err {
        Error::Http(e) => assert!(e.is_connect()),
        other => panic!("Expected connection error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_full_url_bypasses_base_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/test"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("https://unused.example.com")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let response = get(&client, &format!("{}/api/test", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[test]
fn test_calculate_backoff_exponential() {
    let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(300));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(600));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(1200));
    assert_eq!(client.calculate_backoff(3), Duration::from_millis(2400));
}

#[test]
fn test_calculate_backoff_respects_max() {
    let config = HttpClientConfig::builder()
        .backoff(Duration::from_millis(300), Duration::from_secs(120))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(client.calculate_backoff(8), Duration::from_millis(76_800));
    assert_eq!(client.calculate_backoff(9), Duration::from_secs(120));
    assert_eq!(client.calculate_backoff(40), Duration::from_secs(120));
}

#[test]
fn test_http_client_debug_hides_headers() {
    let config = HttpClientConfig::builder().bearer_token("super-secret").build();
    let client = HttpClient::with_config(config).unwrap();
    let debug_str = format!("{client:?}");

    assert!(debug_str.contains("HttpClient"));
    assert!(!debug_str.contains("super-secret"));
}

#[tokio::test]
async fn test_http_client_with_rate_limiter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .rate_limit(RateLimiterConfig::new(100, 10))
        .build();

    let client = HttpClient::with_config(config).unwrap();
    assert!(client.config().rate_limit.is_some());

    for _ in 0..3 {
        let response = get(&client, "/api/data").await.unwrap();
        assert_eq!(response.status, 200);
    }
}
