use std::{
    collections::HashMap,
    pin::Pin,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    task::{Context, Poll},
};

use anyhow::{Result, bail};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::Stream;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::mpsc};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use weather_core::{Config, Dispatcher, dispatch, tools::SERVICE_NAME};

/// How many successor ports to try when the configured one is taken.
const PORT_RETRIES: u16 = 4;

/// Open SSE connections, keyed by a monotonically increasing client id.
///
/// Owned by the HTTP transport; the dispatcher never sees it. Clients are
/// added on connect and removed when their stream is dropped.
#[derive(Debug, Default)]
struct ClientSet {
    next_id: AtomicU64,
    senders: Mutex<HashMap<u64, mpsc::UnboundedSender<String>>>,
}

impl ClientSet {
    fn senders(&self) -> MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<String>>> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new client; returns its id and the receiving half.
    fn register(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders().insert(id, tx);
        (id, rx)
    }

    fn deregister(&self, id: u64) {
        self.senders().remove(&id);
    }

    /// Send a payload to every open connection, pruning closed ones.
    fn broadcast(&self, payload: &str) {
        self.senders().retain(|id, tx| {
            if tx.send(payload.to_string()).is_ok() {
                true
            } else {
                debug!(client = id, "pruning closed SSE client");
                false
            }
        });
    }

    fn len(&self) -> usize {
        self.senders().len()
    }
}

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    clients: Arc<ClientSet>,
    auth_token: Option<String>,
}

/// One client's SSE event stream; deregisters itself when the peer
/// disconnects and axum drops the stream.
struct ClientStream {
    id: u64,
    rx: mpsc::UnboundedReceiver<String>,
    clients: Arc<ClientSet>,
}

impl Stream for ClientStream {
    type Item = std::result::Result<Event, std::convert::Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(payload)) => Poll::Ready(Some(Ok(Event::default().data(payload)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ClientStream {
    fn drop(&mut self) {
        self.clients.deregister(self.id);
        info!(client = self.id, "SSE client disconnected");
    }
}

/// Check the bearer-token gate, when one is configured.
fn authorize(state: &AppState, headers: &HeaderMap) -> std::result::Result<(), Response> {
    let Some(expected) = &state.auth_token else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "Invalid or missing bearer token").into_response())
    }
}

/// `GET /events` (alias `/stream`): upgrade to a long-lived SSE connection.
async fn handle_events(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let (id, rx) = state.clients.register();
    info!(client = id, open = state.clients.len(), "SSE client connected");

    let stream = ClientStream {
        id,
        rx,
        clients: state.clients.clone(),
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// `POST /mcp`: dispatch one envelope. The response goes back as the HTTP
/// body and is broadcast to every open SSE connection.
async fn handle_mcp(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let response = dispatch::dispatch_raw(&state.dispatcher, &body).await;
    let payload = response.to_json();

    state.clients.broadcast(&payload);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        payload,
    )
        .into_response()
}

/// `GET /mcp/info`: ungated health endpoint for container probes.
async fn handle_info() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", get(handle_events))
        .route("/stream", get(handle_events))
        .route("/mcp", post(handle_mcp))
        .route("/mcp/info", get(handle_info))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured port, falling back to a bounded run of successors.
async fn bind_with_retry(host: &str, base_port: u16) -> Result<TcpListener> {
    let last_port = base_port.saturating_add(PORT_RETRIES);
    for port in base_port..=last_port {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => {
                if port != base_port {
                    warn!(port, base_port, "configured port was taken, bound a successor");
                }
                return Ok(listener);
            }
            Err(err) => debug!(port, %err, "bind failed"),
        }
    }

    bail!(
        "Could not bind {host} on any port in {base_port}-{last_port}. \
         Stop the process occupying them, or pick a different port with --port or HTTP_PORT."
    )
}

/// Run the HTTP/SSE front end until the process is terminated.
pub async fn run(dispatcher: Arc<Dispatcher>, config: &Config) -> Result<()> {
    let state = AppState {
        dispatcher,
        clients: Arc::new(ClientSet::default()),
        auth_token: config.auth_token.clone(),
    };

    let listener = bind_with_retry(config.host(), config.port()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, gated = state.auth_token.is_some(), "HTTP transport ready");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
