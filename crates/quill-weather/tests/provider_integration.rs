//! Integration tests for WeatherProvider using wiremock.

use std::time::Duration;

use quill_core::NetworkError;
use quill_weather::{WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn perth_payload() -> serde_json::Value {
    serde_json::json!({
        "location": { "name": "Perth", "country": "Australia" },
        "current": {
            "temp_c": 22.5,
            "condition": { "text": "Sunny" }
        }
    })
}

fn provider_for(server: &MockServer) -> WeatherProvider {
    WeatherProvider::new(server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_key_location_and_aqi() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "Perth,Australia"))
        .and(query_param("aqi", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(perth_payload()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let snapshot = provider_for(&mock_server)
        .fetch_current("test-key", "Perth,Australia")
        .await
        .unwrap();

    assert_eq!(snapshot.as_json(), &perth_payload());
    assert_eq!(snapshot.summary(), "Perth: 22.5°C, Sunny");
}

#[tokio::test]
async fn test_non_success_status_carries_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"error":{"code":2006,"message":"API key is invalid."}}"#),
        )
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch_current("bad-key", "Perth,Australia")
        .await
        .unwrap_err();

    match &err {
        WeatherError::Api { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("API key is invalid."));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert!(err.to_string().starts_with("External API failed: "));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider_for(&mock_server)
        .fetch_current("test-key", "Perth,Australia")
        .await;

    assert!(matches!(result, Err(WeatherError::Api { status: 503, .. })));
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let result = provider_for(&mock_server)
        .fetch_current("test-key", "Perth,Australia")
        .await;

    assert!(matches!(result, Err(WeatherError::Parse(_))));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(perth_payload())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::new(mock_server.uri(), Duration::from_millis(200)).unwrap();
    let result = provider.fetch_current("test-key", "Perth,Australia").await;

    assert!(
        matches!(result, Err(WeatherError::Network(NetworkError::Timeout))),
        "expected timeout, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    // Nothing listens on port 9 on the loopback interface
    let provider = WeatherProvider::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let result = provider.fetch_current("test-key", "Perth,Australia").await;

    assert!(matches!(result, Err(WeatherError::Network(_))));
}
