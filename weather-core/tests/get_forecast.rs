//! End-to-end scenarios: envelope in, envelope out, upstream stubbed.

use std::sync::Arc;

use httpmock::MockServer;
use serde_json::Value;

use weather_core::provider::openweather::OpenWeatherProvider;
use weather_core::tools::GetForecastTool;
use weather_core::{Dispatcher, dispatch};

const CURRENT_PARIS: &str = r#"{
    "coord": {"lon": 2.35, "lat": 48.85},
    "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d"}],
    "main": {"temp": 11.2, "feels_like": 10.1, "pressure": 1018, "humidity": 72},
    "wind": {"speed": 4.6, "deg": 250},
    "dt": 1740819600,
    "sys": {"country": "FR"},
    "name": "Paris"
}"#;

fn forecast_body(entries: usize) -> String {
    let list: Vec<String> = (0..entries)
        .map(|i| {
            format!(
                r#"{{"dt": {}, "main": {{"temp": {}, "feels_like": 9.0, "pressure": 1015, "humidity": 70}}, "weather": [{{"main": "Rain", "description": "light rain", "icon": "10d"}}], "wind": {{"speed": 3.1, "deg": 210}}}}"#,
                1_740_787_200 + i as i64 * 10_800,
                8.0 + i as f64 * 0.5,
            )
        })
        .collect();

    format!(
        r#"{{"city": {{"name": "Paris", "country": "FR", "coord": {{"lat": 48.85, "lon": 2.35}}}}, "list": [{}]}}"#,
        list.join(",")
    )
}

fn dispatcher(server: &MockServer) -> Dispatcher {
    let provider =
        OpenWeatherProvider::new("test-key".to_string()).with_base_url(server.base_url());
    Dispatcher::new(vec![Arc::new(GetForecastTool::new(
        Arc::new(provider),
        None,
    ))])
}

async fn dispatch_json(dispatcher: &Dispatcher, raw: &str) -> Value {
    let response = dispatch::dispatch_raw(dispatcher, raw).await;
    serde_json::from_str(&response.to_json()).expect("response envelope is JSON")
}

#[tokio::test]
async fn one_day_request_yields_the_current_weather_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/weather").query_param("q", "Paris,fr");
        then.status(200)
            .header("content-type", "application/json")
            .body(CURRENT_PARIS);
    });

    let response = dispatch_json(
        &dispatcher(&server),
        r#"{"type":"tool","tool":"get_forecast","params":{"city":"Paris,fr","days":1}}"#,
    )
    .await;

    assert_eq!(response["status"], "success");
    let data = &response["data"];
    assert_eq!(data["location"]["name"], "Paris");
    assert_eq!(data["location"]["country"], "FR");
    assert_eq!(data["current"]["temp"], 11.2);
    assert_eq!(data["current"]["weather"]["main"], "Clouds");
    assert_eq!(data["current"]["weather"]["description"], "scattered clouds");
}

#[tokio::test]
async fn three_day_request_yields_three_summaries_with_hourly_detail() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/forecast").query_param("q", "Paris,fr");
        then.status(200)
            .header("content-type", "application/json")
            .body(forecast_body(24));
    });

    let response = dispatch_json(
        &dispatcher(&server),
        r#"{"type":"tool","tool":"get_forecast","params":{"city":"Paris,fr","days":3}}"#,
    )
    .await;

    assert_eq!(response["status"], "success");
    let forecast = response["data"]["forecast"].as_array().expect("forecast");
    assert_eq!(forecast.len(), 3);
    for day in forecast {
        assert!(!day["hourly"].as_array().expect("hourly").is_empty());
        assert_eq!(day["summary"]["weather"]["main"], "Rain");
    }
}

#[tokio::test]
async fn unknown_city_surfaces_as_an_error_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/weather");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"cod":"404","message":"city not found"}"#);
    });

    let response = dispatch_json(
        &dispatcher(&server),
        r#"{"type":"tool","tool":"get_forecast","params":{"city":"Nowhere,zz","days":1}}"#,
    )
    .await;

    assert_eq!(response["status"], "error");
    assert_eq!(response["error"], "city not found");
}

#[tokio::test]
async fn unregistered_tool_is_reported_by_name() {
    let server = MockServer::start();

    let response = dispatch_json(
        &dispatcher(&server),
        r#"{"type":"tool","tool":"foo","params":{}}"#,
    )
    .await;

    assert_eq!(response["status"], "error");
    assert_eq!(response["error"], "Tool not found: foo");
}
