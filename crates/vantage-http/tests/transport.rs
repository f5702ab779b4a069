use std::time::{Duration, Instant};

use serde_json::json;
use vantage_core::{ApiTransport, ClientConfig, DataType, RawResponse, RequestParameters, VantageError};
use vantage_http::HttpTransport;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer, premium: bool, throttle: Duration) -> HttpTransport {
    let config = ClientConfig::new("test-key")
        .with_base_url(server.uri())
        .with_premium(premium)
        .with_throttle(throttle);
    HttpTransport::new(&config).unwrap()
}

fn quote_params() -> RequestParameters {
    RequestParameters::new("GLOBAL_QUOTE")
        .with("symbol", "IBM")
        .with("apikey", "test-key")
}

#[tokio::test]
async fn fetch_sends_parameters_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "GLOBAL_QUOTE"))
        .and(query_param("symbol", "IBM"))
        .and(query_param("apikey", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(json!({"Global Quote": {"01. symbol": "IBM"}}).to_string()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server, true, Duration::ZERO);
    let raw = transport.fetch(&quote_params(), DataType::Json).await.unwrap();
    assert_eq!(raw, RawResponse::Json(json!({"Global Quote": {"01. symbol": "IBM"}})));
    assert_eq!(transport.calls().await, 1);
}

#[tokio::test]
async fn fetch_decodes_body_of_failed_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string(json!({"Note": "Thank you for using Alpha Vantage!"}).to_string()),
        )
        .mount(&server)
        .await;

    let transport = transport(&server, true, Duration::ZERO);
    let raw = transport.fetch(&quote_params(), DataType::Json).await.unwrap();
    assert!(matches!(raw, RawResponse::Json(ref v) if v.get("Note").is_some()));
}

#[tokio::test]
async fn fetch_returns_csv_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "IPO_CALENDAR"))
        .respond_with(ResponseTemplate::new(200).set_body_string("symbol,name\r\nABC,Abc Corp\r\n"))
        .mount(&server)
        .await;

    let transport = transport(&server, true, Duration::ZERO);
    let params = RequestParameters::new("IPO_CALENDAR").with("apikey", "test-key");
    let raw = transport.fetch(&params, DataType::Csv).await.unwrap();
    assert_eq!(raw, RawResponse::Text("symbol,name\nABC,Abc Corp\n".to_string()));
}

#[tokio::test]
async fn fetch_rejects_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&server)
        .await;

    let transport = transport(&server, true, Duration::ZERO);
    let err = transport.fetch(&quote_params(), DataType::Json).await.unwrap_err();
    assert!(matches!(err, VantageError::Parse(_)));
}

#[tokio::test]
async fn fetch_reports_network_failure() {
    let config = ClientConfig::new("test-key")
        .with_base_url("http://127.0.0.1:9/query")
        .with_premium(true)
        .with_timeout(Duration::from_secs(2));
    let transport = HttpTransport::new(&config).unwrap();
    let err = transport.fetch(&quote_params(), DataType::Json).await.unwrap_err();
    assert!(matches!(err, VantageError::Network(_)));
}

#[tokio::test]
async fn free_tier_calls_are_spaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let transport = transport(&server, false, Duration::from_millis(200));
    let start = Instant::now();
    transport.fetch(&quote_params(), DataType::Json).await.unwrap();
    transport.fetch(&quote_params(), DataType::Json).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(200));
    assert_eq!(transport.calls().await, 2);
}

#[tokio::test]
async fn invalid_proxy_is_rejected() {
    let config = ClientConfig::new("test-key").with_proxy("https", "::not a url::");
    let err = HttpTransport::new(&config).unwrap_err();
    assert!(matches!(err, VantageError::InvalidParameter(_)));
}
