//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use hiroba_shared::{
    protocol::{self, ClientEvent},
    time::now_rfc3339,
};

use crate::{
    hub::{ConnectionId, PusherChannel},
    state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver for frames addressed to this client
/// * `sender` - WebSocket sink to send frames to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
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
    let id: ConnectionId = Uuid::new_v4();

    // Create a channel for this client to receive frames
    let (tx, rx): (PusherChannel, _) = mpsc::unbounded_channel();
    state.hub.register(id, tx).await;
    tracing::info!("Connection {} opened", id);

    let state_clone = state.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => handle_event(&state_clone, id, &text).await,
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push frames from the hub to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.hub.unregister(id).await;
    tracing::info!("Connection {} closed", id);
}

async fn handle_event(state: &AppState, id: ConnectionId, text: &str) {
    let event: ClientEvent = match protocol::decode(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Ignoring frame from {}: {}", id, e);
            return;
        }
    };

    match event {
        ClientEvent::JoinRoom(room_id) if room_id.is_empty() => {
            tracing::warn!("Connection {} tried to join an empty room id", id);
        }
        ClientEvent::JoinRoom(room_id) => state.hub.join(id, room_id).await,
        ClientEvent::ChatMessage(chat) => {
            let timestamp = now_rfc3339(state.clock.as_ref());
            let delivered = state.hub.relay_chat(id, chat, timestamp).await;
            tracing::debug!("Relayed message from {} to {} clients", id, delivered);
        }
    }
}
