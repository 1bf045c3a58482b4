use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Location, WeatherSample};

pub mod openweather;

/// Upper forecast horizon of the free 5-day/3-hour upstream API.
pub const MAX_FORECAST_DAYS: u8 = 5;

/// Abstraction over the upstream weather API.
///
/// Implementations are stateless and safe to call concurrently; a single
/// attempt per call, no retries.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a free-text city query, optionally `"Name,CC"`.
    /// The query is passed through verbatim; the upstream decides whether it
    /// resolves.
    async fn current(&self, city: &str) -> Result<(Location, WeatherSample)>;

    /// 3-hour-resolution samples covering up to `days` days, plus the
    /// resolved location. `days` is clamped to `[1, MAX_FORECAST_DAYS]`.
    async fn forecast(&self, city: &str, days: u8) -> Result<(Location, Vec<WeatherSample>)>;
}
