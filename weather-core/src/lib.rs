//! Core library for the weather MCP server.
//!
//! This crate defines:
//! - Configuration handling (config file + environment overlay)
//! - The error taxonomy shared by every layer
//! - Abstraction over the upstream weather API
//! - Forecast aggregation and response shaping
//! - The tool registry / dispatcher behind the envelope protocol
//!
//! It is used by `weather-server`, but can also be reused by other binaries
//! or services.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod forecast;
pub mod format;
pub mod model;
pub mod provider;
pub mod tools;

pub use config::{Config, TransportMode};
pub use dispatch::{Dispatcher, RequestEnvelope, ResponseEnvelope, Tool};
pub use error::{Error, Result};
pub use model::{Condition, DaySummary, Location, WeatherSample};
pub use provider::WeatherProvider;
