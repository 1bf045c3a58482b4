use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_CITY: &str = "Beijing,cn";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Placeholder keys shipped in sample configs; treated as "not configured".
const PLACEHOLDER_KEYS: &[&str] = &["YOUR_OPENWEATHERMAP_API_KEY", "your_api_key_here"];

/// Transport front end selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    Stdio,
    Sse,
    StreamableHttp,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Sse => "sse",
            TransportMode::StreamableHttp => "streamable-http",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "stdio" => Ok(TransportMode::Stdio),
            "sse" => Ok(TransportMode::Sse),
            "streamable-http" => Ok(TransportMode::StreamableHttp),
            _ => Err(Error::Configuration(format!(
                "Unknown transport mode '{value}'. Supported modes: stdio, sse, streamable-http."
            ))),
        }
    }
}

/// Top-level configuration. File values are overridden by environment
/// variables, which are overridden by CLI flags; anything still unset falls
/// back to the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub default_city: Option<String>,
    /// "stdio", "sse" or "streamable-http".
    pub mode: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// When set, HTTP requests must carry `Authorization: Bearer <token>`.
    pub auth_token: Option<String>,
}

impl Config {
    /// Load from the platform config dir, or return an empty default if no
    /// file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&contents).map_err(|e| {
            Error::Configuration(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-mcp", "weather-server").ok_or_else(|| {
            Error::Configuration("Could not determine platform config directory".to_string())
        })?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment variables onto the loaded values.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(key) = env::var("OPENWEATHERMAP_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(city) = env::var("DEFAULT_CITY") {
            self.default_city = Some(city);
        }
        if let Ok(mode) = env::var("MCP_TRANSPORT_MODE") {
            self.mode = Some(mode);
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.host = Some(host);
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            let port = port.parse::<u16>().map_err(|_| {
                Error::Configuration(format!("HTTP_PORT must be a port number, got '{port}'"))
            })?;
            self.port = Some(port);
        }
        if let Ok(token) = env::var("MCP_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
        Ok(())
    }

    /// The API key, unless it is absent, empty, or one of the sample
    /// placeholders.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty() && !PLACEHOLDER_KEYS.contains(key))
    }

    pub fn transport_mode(&self) -> Result<TransportMode> {
        match &self.mode {
            Some(mode) => mode.parse(),
            None => Ok(TransportMode::default()),
        }
    }

    pub fn city(&self) -> &str {
        self.default_city.as_deref().unwrap_or(DEFAULT_CITY)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}
