// src/websocket.rs

use axum::{
    Json, Router,
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, Utf8Bytes, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::broadcast::broadcast;
use crate::channel::channel;
use crate::models::{ChatMessage, ClientMessage};
use crate::state::AppState;

/// Outbound messages buffered per connection before senders have to wait.
const OUTBOUND_BUFFER: usize = 64;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/members", get(members_handler))
        .route("/rooms", get(rooms_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ConnectParams {
    #[serde(default)]
    nickname: String,
}

/// The handler for the WebSocket route. Validates the nickname before the
/// upgrade completes: a missing or empty one is a bad request, a taken one a
/// conflict.
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> Response {
    let nickname = params.nickname.trim().to_string();
    if nickname.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "nickname query parameter is required",
        )
            .into_response();
    }
    if state.registry.is_present(&nickname) {
        return (StatusCode::CONFLICT, "nickname is already taken").into_response();
    }
    debug!(%nickname, "client connecting");
    ws.on_upgrade(move |socket| handle_socket(socket, state, nickname))
}

/// Manages the lifecycle of one client connection: replay, join, message
/// loop, leave.
async fn handle_socket(socket: WebSocket, state: AppState, nickname: String) {
    let (sink, mut stream) = socket.split();
    let (client, outbound) = channel(OUTBOUND_BUFFER);
    let writer = tokio::spawn(pump_outbound(outbound, sink));

    // Replay the archive window before joining, oldest first. A message that
    // arrives mid-replay reaches only already-joined members, so this client
    // can never receive it twice.
    for msg in state.archive.window() {
        if client.send(msg).await.is_err() {
            warn!(%nickname, "client disconnected during history replay");
            writer.abort();
            return;
        }
    }

    // The pre-upgrade check races with other connections upgrading at the
    // same time; joining settles it.
    let _presence = match state.registry.join(&nickname, client.clone()) {
        Ok(guard) => guard,
        Err(err) => {
            warn!(%nickname, error = %err, "refusing connection");
            writer.abort();
            return;
        }
    };

    // Receive loop: inbound text frames are recorded and fanned out to every
    // member, the sender included.
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let inbound: ClientMessage = match serde_json::from_str(&text) {
                    Ok(inbound) => inbound,
                    Err(err) => {
                        warn!(%nickname, error = %err, "ignoring malformed message");
                        continue;
                    }
                };
                let msg = ChatMessage::new(inbound.message, nickname.clone());
                state.archive.record(msg.clone());
                broadcast(&msg, state.registry.channels()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(%nickname, error = %err, "websocket error, closing session");
                break;
            }
        }
    }

    // Dropping the presence guard deregisters the nickname; the writer has
    // nothing left to deliver to.
    writer.abort();
}

/// Drains a connection's outbound queue into its websocket sink.
async fn pump_outbound(
    mut outbound: mpsc::Receiver<ChatMessage>,
    mut sink: SplitSink<WebSocket, Message>,
) {
    while let Some(msg) = outbound.recv().await {
        let text = match serde_json::to_string(&msg) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "failed to serialize outbound message");
                continue;
            }
        };
        if sink.send(Message::Text(Utf8Bytes::from(text))).await.is_err() {
            break;
        }
    }
}

/// Returns the nicknames currently present.
async fn members_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.registry.members())
}

/// Room listing stub, reserved for future multi-room support.
async fn rooms_handler() -> Json<Vec<String>> {
    Json(Vec::new())
}
