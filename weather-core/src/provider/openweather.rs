use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Condition, Location, WeatherSample};

use super::{MAX_FORECAST_DAYS, WeatherProvider};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Samples per forecast day; the upstream exposes 3-hour resolution.
const SAMPLES_PER_DAY: u8 = 8;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the client at a different endpoint. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn ensure_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::Configuration(
                "API key not configured. Set OPENWEATHERMAP_API_KEY or add `api_key` \
                 to the config file."
                    .to_string(),
            ));
        }
        Ok(())
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "requesting OpenWeatherMap");

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to reach OpenWeatherMap: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            Error::Upstream(format!("Failed to read OpenWeatherMap response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Error::Upstream(upstream_message(status, &body)));
        }

        Ok(body)
    }
}

/// Prefer the `message` field of the upstream error body; fall back to the
/// HTTP status line.
fn upstream_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct OwErrorBody {
        message: Option<String>,
    }

    match serde_json::from_str::<OwErrorBody>(body) {
        Ok(OwErrorBody {
            message: Some(message),
        }) if !message.is_empty() => message,
        _ => format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Error")
        ),
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    sys: OwSys,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn build_sample(dt: i64, main: OwMain, weather: Vec<OwWeather>, wind: OwWind) -> WeatherSample {
    let condition = weather
        .into_iter()
        .next()
        .map(|w| Condition {
            main: w.main,
            description: w.description,
            icon: w.icon,
        })
        .unwrap_or_else(|| Condition {
            main: "Unknown".to_string(),
            description: "Unknown".to_string(),
            icon: String::new(),
        });

    WeatherSample {
        time: unix_to_utc(dt),
        temperature: main.temp,
        feels_like: main.feels_like,
        humidity: main.humidity,
        pressure: main.pressure,
        wind_speed: wind.speed,
        wind_direction: wind.deg,
        condition,
    }
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<(Location, WeatherSample)> {
        self.ensure_key()?;

        let body = self
            .get_json(
                "weather",
                &[("q", city), ("appid", &self.api_key), ("units", "metric")],
            )
            .await?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Upstream(format!("Failed to parse OpenWeatherMap current JSON: {e}"))
        })?;

        let location = Location {
            name: parsed.name,
            country: parsed.sys.country,
            latitude: parsed.coord.lat,
            longitude: parsed.coord.lon,
        };
        let sample = build_sample(parsed.dt, parsed.main, parsed.weather, parsed.wind);

        Ok((location, sample))
    }

    async fn forecast(&self, city: &str, days: u8) -> Result<(Location, Vec<WeatherSample>)> {
        self.ensure_key()?;

        let days = days.clamp(1, MAX_FORECAST_DAYS);
        let cnt = (days * SAMPLES_PER_DAY).to_string();

        let body = self
            .get_json(
                "forecast",
                &[
                    ("q", city),
                    ("appid", &self.api_key),
                    ("units", "metric"),
                    ("cnt", &cnt),
                ],
            )
            .await?;

        let parsed: OwForecastResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Upstream(format!("Failed to parse OpenWeatherMap forecast JSON: {e}"))
        })?;

        let location = Location {
            name: parsed.city.name,
            country: parsed.city.country,
            latitude: parsed.city.coord.lat,
            longitude: parsed.city.coord.lon,
        };
        let samples = parsed
            .list
            .into_iter()
            .map(|e| build_sample(e.dt, e.main, e.weather, e.wind))
            .collect();

        Ok((location, samples))
    }
}
