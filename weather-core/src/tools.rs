//! The tools registered with the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::dispatch::Tool;
use crate::error::{Error, Result};
use crate::forecast::aggregate;
use crate::format;
use crate::provider::{MAX_FORECAST_DAYS, WeatherProvider};

/// Service identifier reported by health checks.
pub const SERVICE_NAME: &str = "weather-mcp-server";

#[derive(Debug, Deserialize)]
struct GetForecastParams {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    days: Option<i64>,
}

/// `get_forecast`: current weather for `days <= 1`, a day-bucketed forecast
/// otherwise. The forecast horizon is capped at [`MAX_FORECAST_DAYS`].
pub struct GetForecastTool {
    provider: Arc<dyn WeatherProvider>,
    default_city: Option<String>,
}

impl GetForecastTool {
    pub fn new(provider: Arc<dyn WeatherProvider>, default_city: Option<String>) -> Self {
        Self {
            provider,
            default_city,
        }
    }
}

#[async_trait]
impl Tool for GetForecastTool {
    fn name(&self) -> &str {
        "get_forecast"
    }

    fn description(&self) -> &str {
        "Get current weather or a multi-day forecast for a city"
    }

    async fn call(&self, params: Value) -> Result<Value> {
        let params: GetForecastParams = serde_json::from_value(params)
            .map_err(|e| Error::Validation(format!("Invalid parameters: {e}")))?;

        let city = params
            .city
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.default_city.clone())
            .ok_or_else(|| Error::Validation("Missing required parameter: city".to_string()))?;

        let days = params.days.unwrap_or(1);
        if days < 1 {
            return Err(Error::Validation(
                "`days` must be a positive integer".to_string(),
            ));
        }

        info!(%city, days, "get_forecast");

        if days == 1 {
            let (location, sample) = self.provider.current(&city).await?;
            Ok(format::current_view(&location, &sample))
        } else {
            let days = days.min(i64::from(MAX_FORECAST_DAYS)) as usize;
            let (location, samples) = self.provider.forecast(&city, days as u8).await?;
            let summaries = aggregate(&samples, days);
            Ok(format::forecast_view(&location, &summaries))
        }
    }
}

/// `health_check`: liveness answer used by container probes.
pub struct HealthCheckTool;

#[async_trait]
impl Tool for HealthCheckTool {
    fn name(&self) -> &str {
        "health_check"
    }

    fn description(&self) -> &str {
        "Report whether the service is running"
    }

    async fn call(&self, _params: Value) -> Result<Value> {
        Ok(json!({ "status": "healthy", "service": SERVICE_NAME }))
    }
}
