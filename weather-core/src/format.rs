//! Pure mappings from the internal domain entities to the external response
//! schema. No I/O, no failure modes.

use serde_json::{Value, json};

use crate::model::{Condition, DaySummary, Location, WeatherSample};

/// `{location, current}` block for a current-weather answer.
pub fn current_view(location: &Location, sample: &WeatherSample) -> Value {
    json!({
        "location": location_block(location),
        "current": {
            "date": sample.time.format("%Y-%m-%d").to_string(),
            "temp": sample.temperature,
            "feels_like": sample.feels_like,
            "humidity": sample.humidity,
            "pressure": sample.pressure,
            "wind_speed": sample.wind_speed,
            "wind_direction": sample.wind_direction,
            "weather": weather_block(&sample.condition),
        },
    })
}

/// `{location, forecast: [...]}` block for a multi-day answer.
pub fn forecast_view(location: &Location, summaries: &[DaySummary]) -> Value {
    let forecast: Vec<Value> = summaries.iter().map(day_block).collect();
    json!({
        "location": location_block(location),
        "forecast": forecast,
    })
}

fn day_block(summary: &DaySummary) -> Value {
    let hourly: Vec<Value> = summary.hourly.iter().map(hourly_block).collect();
    json!({
        "date": summary.date.format("%Y-%m-%d").to_string(),
        "summary": {
            "avg_temp": round1(summary.avg_temperature),
            "avg_humidity": round1(summary.avg_humidity),
            "weather": weather_block(&summary.condition),
        },
        "hourly": hourly,
    })
}

fn hourly_block(sample: &WeatherSample) -> Value {
    json!({
        "time": sample.time.to_rfc3339(),
        "temp": sample.temperature,
        "feels_like": sample.feels_like,
        "humidity": sample.humidity,
        "pressure": sample.pressure,
        "wind_speed": sample.wind_speed,
        "wind_direction": sample.wind_direction,
        "weather": weather_block(&sample.condition),
    })
}

fn location_block(location: &Location) -> Value {
    json!({
        "name": location.name,
        "country": location.country,
        "coordinates": { "lat": location.latitude, "lon": location.longitude },
    })
}

fn weather_block(condition: &Condition) -> Value {
    json!({
        "main": condition.main,
        "description": condition.description,
        "icon": condition.icon,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
