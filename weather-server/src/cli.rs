use std::path::PathBuf;

use clap::Parser;

use weather_core::{Config, TransportMode};

/// Top-level CLI struct. Every flag overrides the corresponding config-file
/// and environment value.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather MCP server")]
pub struct Cli {
    /// Transport front end: stdio, sse or streamable-http.
    #[arg(long)]
    pub transport: Option<TransportMode>,

    /// Bind host for the HTTP transports.
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port for the HTTP transports.
    #[arg(long)]
    pub port: Option<u16>,

    /// Default city used when a request omits one.
    #[arg(long)]
    pub city: Option<String>,

    /// Explicit config file path instead of the platform default.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn apply(&self, config: &mut Config) {
        if let Some(mode) = self.transport {
            config.mode = Some(mode.as_str().to_string());
        }
        if let Some(host) = &self.host {
            config.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            config.port = Some(port);
        }
        if let Some(city) = &self.city {
            config.default_city = Some(city.clone());
        }
    }
}
