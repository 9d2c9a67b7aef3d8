//! Integration tests for WeatherProvider and the timeline builder using wiremock.

use chrono::NaiveDate;
use skycast_weather::{
    build_timeline, EntrySource, FetchError, LocationQuery, ProviderSettings, TimelineDates,
    WeatherProvider,
};
use skycast_core::FetchErrorKind;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> WeatherProvider {
    WeatherProvider::new(ProviderSettings {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        city_forecast_days: 4,
        coords_forecast_days: 3,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn forecast_day(date: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "date": date,
        "day": {"maxtemp_c": 30.0, "mintemp_c": 19.5, "avgtemp_c": 24.8,
                "maxwind_kph": 12.0, "totalprecip_mm": 0.4, "avghumidity": 55.0,
                "daily_chance_of_rain": 20, "uv": 7.0,
                "condition": {"text": text, "icon": "//cdn.weatherapi.com/d/113.png", "code": 1000}},
        "astro": {"sunrise": "06:38 AM", "sunset": "06:31 PM",
                  "moonrise": "04:10 AM", "moonset": "03:20 PM"}
    })
}

fn forecast_body(name: &str, condition: &str) -> serde_json::Value {
    serde_json::json!({
        "location": {"name": name, "region": "Karnataka", "country": "India",
                     "tz_id": "Asia/Kolkata", "localtime": "2024-03-05 14:30",
                     "lat": 12.98, "lon": 77.58},
        "current": {
            "last_updated": "2024-03-05 14:15",
            "temp_c": 31.2, "feelslike_c": 30.1, "is_day": 1,
            "condition": {"text": condition, "icon": "//cdn.weatherapi.com/d/116.png", "code": 1003},
            "wind_kph": 11.2, "wind_degree": 90, "wind_dir": "E", "gust_kph": 14.0,
            "humidity": 29, "cloud": 25, "vis_km": 6.0, "pressure_mb": 1014.0, "uv": 8.0,
            "air_quality": {"co": 390.5, "no2": 12.1, "o3": 80.2, "so2": 6.4,
                            "pm2_5": 31.4, "pm10": 44.9, "us-epa-index": 2, "gb-defra-index": 3}
        },
        "forecast": {"forecastday": [
            forecast_day("2024-03-05", "Sunny"),
            forecast_day("2024-03-06", "Partly cloudy"),
            forecast_day("2024-03-07", "Patchy rain possible"),
            forecast_day("2024-03-08", "Sunny"),
        ]},
        "alerts": {"alert": []}
    })
}

fn history_body(date: &str) -> serde_json::Value {
    serde_json::json!({
        "location": {"name": "Bengaluru"},
        "forecast": {"forecastday": [forecast_day(date, "Sunny")]}
    })
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_fetch_city_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "Bengaluru"))
        .and(query_param("days", "4"))
        .and(query_param("aqi", "yes"))
        .and(query_param("alerts", "yes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body("Bengaluru", "Patchy light rain")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = provider(&server)
        .fetch(&LocationQuery::city("Bengaluru"))
        .await
        .unwrap();

    assert_eq!(payload.location.name, "Bengaluru");
    assert_eq!(payload.current.condition.text, "Patchy light rain");
    assert_eq!(payload.forecast.len(), 4);
    assert_eq!(payload.today().unwrap().date, date("2024-03-05"));
    assert_eq!(payload.current.air_quality.pm2_5, 31.4);
}

#[tokio::test]
async fn test_fetch_coordinates_requests_three_days() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "12.97,77.59"))
        .and(query_param("days", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Bengaluru", "Clear")))
        .expect(1)
        .mount(&server)
        .await;

    let payload = provider(&server)
        .fetch(&LocationQuery::coordinates(12.97, 77.59))
        .await
        .unwrap();
    assert_eq!(payload.location.name, "Bengaluru");
}

#[tokio::test]
async fn test_unknown_city_is_city_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": 1006, "message": "No matching location found."}
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch(&LocationQuery::city("Atlantis"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FetchError::CityNotFound("No matching location found.".to_string())
    );
    assert_eq!(err.kind(), FetchErrorKind::CityNotFound);
}

#[tokio::test]
async fn test_rejected_coordinates_are_location_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"code": 1006, "message": "No matching location found."}
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch(&LocationQuery::coordinates(95.0, 10.0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::LocationError);
}

#[tokio::test]
async fn test_server_error_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch(&LocationQuery::city("Pune"))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Network("HTTP error! status: 503".to_string()));
}

#[tokio::test]
async fn test_invalid_key_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"code": 2006, "message": "API key is invalid."}
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch(&LocationQuery::city("Pune"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::NetworkError);
}

#[tokio::test]
async fn test_incomplete_payload_is_data_error() {
    let server = MockServer::start().await;

    let mut body = forecast_body("Pune", "Sunny");
    body["current"].as_object_mut().unwrap().remove("air_quality");

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch(&LocationQuery::city("Pune"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::DataError);
}

#[tokio::test]
async fn test_non_json_success_is_data_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch(&LocationQuery::city("Pune"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::DataError);
}

#[tokio::test]
async fn test_history_day() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history.json"))
        .and(query_param("q", "Pune"))
        .and(query_param("dt", "2024-03-04"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_body("2024-03-04")))
        .expect(1)
        .mount(&server)
        .await;

    let day = provider(&server)
        .fetch_history_day(&LocationQuery::city("Pune"), date("2024-03-04"))
        .await
        .unwrap();
    assert_eq!(day.date, date("2024-03-04"));
    assert_eq!(day.day.condition.text, "Sunny");
}

#[tokio::test]
async fn test_timeline_with_partial_history() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Pune", "Sunny")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history.json"))
        .and(query_param("dt", "2024-03-04"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_body("2024-03-04")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history.json"))
        .and(query_param("dt", "2024-03-03"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history.json"))
        .and(query_param("dt", "2024-03-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_body("2024-03-02")))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let query = LocationQuery::city("Pune");
    let payload = provider.fetch(&query).await.unwrap();
    let timeline =
        build_timeline(
        &provider,
        &query,
        &payload.forecast,
        TimelineDates::fixed(date("2024-03-05")),
        3,
    )
    .await;

    assert_eq!(timeline.len(), 2 + payload.forecast.len());
    let dates: Vec<_> = timeline.iter().map(|e| e.display_date()).collect();
    assert_eq!(
        dates,
        vec![
            "02-03-2024",
            "04-03-2024",
            "05-03-2024",
            "06-03-2024",
            "07-03-2024",
            "08-03-2024"
        ]
    );
    assert_eq!(timeline[1].source, EntrySource::History);
    assert!(timeline[2].is_today);
}

#[tokio::test]
async fn test_today_marker_follows_local_date_not_history_anchor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Pune", "Sunny")))
        .mount(&server)
        .await;
    for dt in ["2024-03-04", "2024-03-03"] {
        Mock::given(method("GET"))
            .and(path("/history.json"))
            .and(query_param("dt", dt))
            .respond_with(ResponseTemplate::new(200).set_body_json(history_body(dt)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let provider = provider(&server);
    let query = LocationQuery::city("Pune");
    let payload = provider.fetch(&query).await.unwrap();

    // UTC is still on the 5th while the local calendar has reached the 6th
    let dates = TimelineDates {
        history_from: date("2024-03-05"),
        today: date("2024-03-06"),
    };
    let timeline = build_timeline(&provider, &query, &payload.forecast, dates, 2).await;

    let marked: Vec<_> = timeline.iter().filter(|e| e.is_today).map(|e| e.date).collect();
    assert_eq!(marked, vec![date("2024-03-06")]);
    assert_eq!(timeline[0].date, date("2024-03-03"));
}
