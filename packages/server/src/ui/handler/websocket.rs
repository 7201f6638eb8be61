//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    infrastructure::{
        dto::conversion::{MalformedEvent, decode_inbound},
        transport::WebSocketTransport,
    },
    ui::state::AppState,
    usecase::RouteError,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives encoded frames from the rx channel and pushes them to the WebSocket sender.
///
/// The registry's transport for this connection is the only producer, so the
/// loop ends once the connection is removed from the registry.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Register the connection with an outbound queue feeding the writer task
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state
        .connect_participant_usecase
        .execute(Arc::new(WebSocketTransport::new(tx)));

    let state_clone = state.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text from '{}': {}", connection_id, text);
                    handle_text(&state_clone, connection_id, text.as_str()).await;
                }
                Message::Binary(_) => {
                    reject(&state_clone, connection_id, MalformedEvent::BinaryFrame).await;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::trace!("Received ping/pong from '{}'", connection_id);
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
            }
        }
    });

    // Spawn a task to push queued frames to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_participant_usecase
        .execute(connection_id)
        .await;
}

async fn handle_text(state: &AppState, connection_id: ConnectionId, text: &str) {
    let event = match decode_inbound(text) {
        Ok(event) => event,
        Err(e) => {
            reject(state, connection_id, e).await;
            return;
        }
    };

    match state.message_router.route(connection_id, event).await {
        Ok(result) => {
            tracing::debug!(
                "Routed event from '{}': {} delivered, {} failed",
                connection_id,
                result.delivered.len(),
                result.failed.len()
            );
        }
        Err(e @ (RouteError::SenderGone(_) | RouteError::UnknownRoom)) => {
            tracing::debug!("Dropping event from '{}': {}", connection_id, e);
        }
        Err(e @ RouteError::MissingPayload) => {
            tracing::warn!("Dropping event from '{}': {}", connection_id, e);
            state
                .message_router
                .reject(connection_id, e.to_string())
                .await;
        }
    }
}

async fn reject(state: &AppState, connection_id: ConnectionId, error: MalformedEvent) {
    tracing::warn!("Malformed event from '{}': {}", connection_id, error);
    state
        .message_router
        .reject(connection_id, error.to_string())
        .await;
}
