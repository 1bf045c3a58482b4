//! Tool registry and envelope dispatch.
//!
//! Every error raised below this boundary is collapsed into the uniform
//! `{"status":"error","error":...}` envelope; exactly one response is
//! produced per dispatched request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};

/// Inbound `{type, tool, params}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Outbound envelope, tagged by `status`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResponseEnvelope {
    Success { data: Value },
    Error { error: String },
}

impl ResponseEnvelope {
    pub fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(data) => Self::Success { data },
            Err(err) => Self::Error {
                error: err.to_string(),
            },
        }
    }

    /// Render as a JSON string. Serialization of this type cannot fail in
    /// practice; the fallback exists to keep the one-response guarantee.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"status":"error","error":"Failed to encode response"}"#.to_string()
        })
    }
}

/// A named operation callable through the envelope protocol.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Invoke with the envelope's `params` object.
    async fn call(&self, params: Value) -> Result<Value>;
}

/// Immutable lookup table from tool name to handler, populated once at
/// startup. No dynamic registration happens in the request path.
pub struct Dispatcher {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Dispatcher {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let tools = tools
            .into_iter()
            .map(|tool| (tool.name().to_string(), tool))
            .collect();
        Self { tools }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve and invoke the named tool. Never lets an error propagate past
    /// this boundary.
    pub async fn dispatch(&self, envelope: RequestEnvelope) -> ResponseEnvelope {
        ResponseEnvelope::from_result(self.run(envelope).await)
    }

    async fn run(&self, envelope: RequestEnvelope) -> Result<Value> {
        if envelope.kind != "tool" {
            return Err(Error::UnknownMessageType(envelope.kind));
        }

        let name = envelope.tool.unwrap_or_default();
        let tool = self
            .tools
            .get(&name)
            .ok_or_else(|| Error::UnknownTool(name.clone()))?;

        let params = envelope.params.unwrap_or_else(|| json!({}));
        debug!(tool = %name, "dispatching tool call");
        tool.call(params).await
    }
}

/// Decode one raw JSON payload (a stdio line or an HTTP body) and dispatch
/// it. A payload that is not valid JSON becomes an error envelope instead of
/// tearing down the transport.
pub async fn dispatch_raw(dispatcher: &Dispatcher, raw: &str) -> ResponseEnvelope {
    match serde_json::from_str::<RequestEnvelope>(raw) {
        Ok(envelope) => dispatcher.dispatch(envelope).await,
        Err(_) => ResponseEnvelope::Error {
            error: Error::InvalidJson.to_string(),
        },
    }
}
