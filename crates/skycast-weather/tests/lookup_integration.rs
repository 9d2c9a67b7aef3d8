//! Integration tests for CityLookupClient and IpGeolocator using wiremock.

use skycast_core::{LookupConfig, LookupError};
use skycast_weather::location::IpGeolocator;
use skycast_weather::{locate_with_timeout, CityLookupClient, Coordinates, Geolocator, LocationError};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lookup_client(server: &MockServer) -> CityLookupClient {
    let config = LookupConfig {
        api_key: "rapid-key".to_string(),
        ..LookupConfig::default()
    };
    CityLookupClient::from_config(&config)
        .unwrap()
        .with_base_url(server.uri())
}

fn city(name: &str, code: &str) -> serde_json::Value {
    serde_json::json!({"name": name, "country": code, "countryCode": code})
}

#[tokio::test]
async fn test_search_ranks_preferred_country() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/cities"))
        .and(query_param("namePrefix", "Pune"))
        .and(query_param("limit", "10"))
        .and(query_param("sort", "-population"))
        .and(header("X-RapidAPI-Key", "rapid-key"))
        .and(header("X-RapidAPI-Host", "wft-geo-db.p.rapidapi.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [city("Punalur", "IN"), city("Puning", "CN"), city("Pune", "IN")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = lookup_client(&server).search("Pune").await.unwrap();
    let labels: Vec<_> = suggestions.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Pune, IN", "Punalur, IN"]);
    assert_eq!(suggestions[0].city, "Pune");
}

#[tokio::test]
async fn test_search_empty_data_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/cities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&server)
        .await;

    let err = lookup_client(&server).search("Xyzzy").await.unwrap_err();
    assert!(matches!(err, LookupError::NotFound));
    assert_eq!(err.user_message(), "City not found");
}

#[tokio::test]
async fn test_search_http_failure_is_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/cities"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = lookup_client(&server).search("Del").await.unwrap_err();
    assert!(matches!(err, LookupError::Network(_)));
    assert_eq!(err.user_message(), "Check your internet connection");
}

#[tokio::test]
async fn test_search_blank_input_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(lookup_client(&server).search("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ip_geolocation_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success", "lat": 12.97, "lon": 77.59, "city": "Bengaluru"
        })))
        .mount(&server)
        .await;

    let geo = IpGeolocator::new(server.uri(), Duration::from_secs(5)).unwrap();
    let coords = locate_with_timeout(&geo, Duration::from_secs(5)).await.unwrap();
    assert_eq!(coords, Coordinates::new(12.97, 77.59));
}

#[tokio::test]
async fn test_ip_geolocation_failure_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail", "message": "private range"
        })))
        .mount(&server)
        .await;

    let geo = IpGeolocator::new(server.uri(), Duration::from_secs(5)).unwrap();
    let err = geo.locate().await.unwrap_err();
    assert_eq!(err, LocationError::Other("private range".to_string()));
}

#[tokio::test]
async fn test_slow_ip_geolocation_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(serde_json::json!({"status": "success", "lat": 1.0, "lon": 2.0})),
        )
        .mount(&server)
        .await;

    let geo = IpGeolocator::new(server.uri(), Duration::from_secs(30)).unwrap();
    let err = locate_with_timeout(&geo, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert_eq!(err, LocationError::Timeout);
}
