//! Integration tests for the Stormglass client using wiremock
//!
//! These tests verify the client's behavior against a mock HTTP server,
//! ensuring proper handling of various response scenarios.

use std::time::Duration;

use integration_stormglass::{
    PointForecastClient, StormglassClient, StormglassConfig, StormglassError,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

/// Sample Stormglass point response
fn sample_point_response() -> serde_json::Value {
    serde_json::json!({
        "hours": [
            {
                "time": "2024-01-15T00:00:00+00:00",
                "waveHeight": {"noaa": 1.2, "sg": 1.4},
                "airTemperature": {"noaa": 4.1, "sg": 3.9}
            },
            {
                "time": "2024-01-15T01:00:00+00:00",
                "waveHeight": {"noaa": 1.3, "sg": 1.5},
                "airTemperature": {"noaa": 4.0, "sg": 3.8}
            }
        ],
        "meta": {
            "cost": 1,
            "dailyQuota": 50,
            "lat": 57.72,
            "lng": 10.58,
            "requestCount": 3
        }
    })
}

fn query() -> Vec<(String, String)> {
    vec![
        ("lat".to_string(), "57.72".to_string()),
        ("lng".to_string(), "10.58".to_string()),
        ("params".to_string(), "airTemperature,waveHeight".to_string()),
    ]
}

fn client_for(server: &MockServer, api_key: Option<&str>) -> StormglassClient {
    StormglassClient::new(StormglassConfig {
        base_url: format!("{}/v2/weather/point", server.uri()),
        api_key: api_key.map(str::to_string),
        connect_timeout_secs: 1,
        timeout_secs: 1,
    })
    .expect("client creation should succeed")
}

#[tokio::test]
async fn test_point_request_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/weather/point"))
        .and(header("Authorization", "test-key"))
        .and(query_param("lat", "57.72"))
        .and(query_param("lng", "10.58"))
        .and(query_param("params", "airTemperature,waveHeight"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_point_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let body = client.point_request(&query()).await.expect("request should succeed");

    let value: serde_json::Value = serde_json::from_slice(&body).expect("valid JSON");
    assert_eq!(value["meta"]["cost"], 1);
    assert_eq!(value["hours"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_error_body_is_returned_for_interpretation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/weather/point"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "errors": {"lat": "Invalid latitude"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let body = client.point_request(&query()).await.expect("error body is returned");

    let value: serde_json::Value = serde_json::from_slice(&body).expect("valid JSON");
    assert_eq!(value["errors"]["lat"], "Invalid latitude");
}

#[tokio::test]
async fn test_rate_limit_without_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/weather/point"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let result = client.point_request(&query()).await;

    assert!(matches!(result, Err(StormglassError::RateLimitExceeded)));
}

#[tokio::test]
async fn test_server_error_without_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/weather/point"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let result = client.point_request(&query()).await;

    assert!(matches!(result, Err(StormglassError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/weather/point"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sample_point_response())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let result = client.point_request(&query()).await;

    assert!(matches!(result, Err(StormglassError::Timeout(_))));
}

#[tokio::test]
async fn test_missing_api_key_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let result = client.point_request(&query()).await;

    assert!(matches!(result, Err(StormglassError::MissingApiKey)));
}

#[tokio::test]
async fn test_connection_refused() {
    let client = StormglassClient::new(StormglassConfig {
        base_url: "http://127.0.0.1:1/v2/weather/point".to_string(),
        api_key: Some("test-key".to_string()),
        connect_timeout_secs: 1,
        timeout_secs: 1,
    })
    .expect("client creation should succeed");

    let result = client.point_request(&query()).await;

    assert!(matches!(
        result,
        Err(StormglassError::ConnectionFailed(_) | StormglassError::Timeout(_) | StormglassError::RequestFailed(_))
    ));
}
