//! Websocket gateway: fans table events out to every client and relays client
//! commands into the table mailbox.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State as AxumState;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use goldpot_types::{InboundMessage, OutboundEvent};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::table::Mailbox;

#[derive(Clone)]
pub struct AppState {
    mailbox: Mailbox,
    broadcaster: broadcast::Sender<OutboundEvent>,
    connections: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(mailbox: Mailbox, broadcaster: broadcast::Sender<OutboundEvent>) -> Self {
        Self {
            mailbox,
            broadcaster,
            connections: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_connection(&self) -> u64 {
        self.connections.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Build the HTTP router. When `public_dir` is set its files are served for
/// every path not otherwise routed.
pub fn router(state: AppState, public_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/healthz", get(healthz))
        .route("/state", get(state_handler));
    let router = match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Current snapshot over plain HTTP, for clients that only poll.
async fn state_handler(AxumState(state): AxumState<AppState>) -> impl IntoResponse {
    match state.mailbox.snapshot().await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    AxumState(state): AxumState<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection = state.next_connection();
    info!(connection, "client connected");

    let (mut sender, mut receiver) = socket.split();
    // Subscribe before announcing the connection so the initial snapshot
    // reaches this client too.
    let mut broadcast_rx = state.broadcaster.subscribe();
    let forward_task = tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!(?err, "failed to encode outbound event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(connection, skipped, "client lagging; events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
    state.mailbox.connect(connection).await;

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<InboundMessage>(&text) {
                Ok(inbound) => state.mailbox.dispatch(connection, inbound).await,
                Err(err) => {
                    warn!(connection, ?err, "invalid inbound message");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.mailbox.disconnect(connection).await;
    forward_task.abort();
    info!(connection, "client disconnected");
}
