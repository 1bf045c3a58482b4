//! Binary crate for the weather MCP server.
//!
//! This crate focuses on:
//! - Resolving configuration from CLI flags, environment and config file
//! - Logging setup (stderr only, so stdout stays free for the stdio
//!   transport)
//! - Running one of the transport front ends over the shared dispatcher

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use weather_core::{
    Config, Dispatcher, TransportMode,
    provider::openweather::OpenWeatherProvider,
    tools::{GetForecastTool, HealthCheckTool},
};

mod cli;
mod transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_server=info,weather_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;
    args.apply(&mut config);

    if config.api_key().is_none() {
        warn!(
            "API key not set or using a placeholder value; upstream calls will fail \
             until OPENWEATHERMAP_API_KEY is configured"
        );
    }

    let provider = Arc::new(OpenWeatherProvider::new(
        config.api_key().unwrap_or_default().to_string(),
    ));
    let dispatcher = Arc::new(Dispatcher::new(vec![
        Arc::new(GetForecastTool::new(
            provider,
            Some(config.city().to_string()),
        )),
        Arc::new(HealthCheckTool),
    ]));

    let mode = config.transport_mode()?;
    info!(%mode, tools = ?dispatcher.tool_names(), "starting weather MCP server");

    match mode {
        TransportMode::Stdio => transport::stdio::run(dispatcher).await?,
        TransportMode::Sse | TransportMode::StreamableHttp => {
            transport::http::run(dispatcher, &config).await?;
        }
    }

    Ok(())
}
