use thiserror::Error;

/// Error taxonomy shared by every layer of the service.
///
/// Each variant renders exactly the message that ends up in the
/// `{"status":"error","error":...}` envelope. All of them are caught at the
/// dispatcher boundary; none terminate the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed tool parameter.
    #[error("{0}")]
    Validation(String),

    /// Upstream API failure: non-2xx status, network error, or a body that
    /// did not parse.
    #[error("{0}")]
    Upstream(String),

    /// Envelope named a tool that is not registered.
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// Envelope `type` was something other than `"tool"`.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// Inbound payload was not valid JSON.
    #[error("Invalid JSON message")]
    InvalidJson,

    /// Server-side misconfiguration, e.g. a missing API key.
    #[error("{0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
