use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One weather condition label as reported by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// A single timestamped observation, parsed from one upstream record.
/// Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub condition: Condition,
}

/// The place a city query resolved to; constant within one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Statistics derived from one calendar day's samples.
#[derive(Debug, Clone)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    /// Most frequent `condition.main` of the day; ties go to the value seen
    /// first in chronological order.
    pub condition: Condition,
    /// The full day bucket, in chronological order.
    pub hourly: Vec<WeatherSample>,
}
