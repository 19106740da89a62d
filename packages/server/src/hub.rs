//! Connection and room registry.
//!
//! ## 責務
//!
//! - 接続中のクライアントと送信チャネルを管理する
//! - クライアントごとに参加中のルームを 1 つだけ保持する
//! - 接続数・ルーム人数の変化を全クライアントへ通知する
//! - チャットメッセージを同じルームの他のメンバーへ中継する
//!
//! Room counts are broadcast to every client; clients keep only the count
//! for the room they are in.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use hiroba_shared::protocol::{
    self, IncomingChat, OutgoingChat, RoomClientCount, ServerEvent, WireTimestamp,
};

/// Sender half used to push frames to one client
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Identifier of one WebSocket connection
pub type ConnectionId = Uuid;

struct ClientSlot {
    sender: PusherChannel,
    room: Option<String>,
}

#[derive(Default)]
pub struct Hub {
    clients: Mutex<HashMap<ConnectionId, ClientSlot>>,
}

impl Hub {
    /// Register a new connection and announce the new client count
    pub async fn register(&self, id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(id, ClientSlot { sender, room: None });
        tracing::debug!("Connection {} registered ({} online)", id, clients.len());

        broadcast(&clients, &ServerEvent::ClientCount(clients.len() as u64));
    }

    /// Remove a connection and announce the counts it affected
    pub async fn unregister(&self, id: ConnectionId) {
        let mut clients = self.clients.lock().await;
        let Some(slot) = clients.remove(&id) else {
            return;
        };
        tracing::debug!("Connection {} unregistered ({} online)", id, clients.len());

        broadcast(&clients, &ServerEvent::ClientCount(clients.len() as u64));
        if let Some(room) = slot.room {
            broadcast_room_count(&clients, room);
        }
    }

    /// Move a connection into `room_id`, leaving its previous room
    pub async fn join(&self, id: ConnectionId, room_id: String) {
        let mut clients = self.clients.lock().await;
        let Some(slot) = clients.get_mut(&id) else {
            tracing::warn!("Join from unknown connection {}", id);
            return;
        };

        let previous = slot.room.replace(room_id.clone());
        tracing::info!("Connection {} joined room '{}'", id, room_id);

        if let Some(previous) = previous.filter(|previous| *previous != room_id) {
            broadcast_room_count(&clients, previous);
        }
        broadcast_room_count(&clients, room_id);
    }

    /// Relay a chat message to the other members of the sender's room.
    ///
    /// Returns the number of clients the message was pushed to. Messages for
    /// a room the sender is not in are dropped.
    pub async fn relay_chat(
        &self,
        id: ConnectionId,
        chat: OutgoingChat,
        timestamp: String,
    ) -> usize {
        let clients = self.clients.lock().await;
        let sender_room = clients.get(&id).and_then(|slot| slot.room.as_deref());
        if chat.room_id.is_empty() || sender_room != Some(chat.room_id.as_str()) {
            tracing::warn!(
                "Dropping message from {} for room '{}' (member of {:?})",
                id,
                chat.room_id,
                sender_room
            );
            return 0;
        }

        let event = ServerEvent::ChatMessage(IncomingChat {
            message: chat.message,
            timestamp: WireTimestamp::Text(timestamp),
        });
        let Some(frame) = encode(&event) else {
            return 0;
        };

        let mut delivered = 0;
        for (target, slot) in clients.iter() {
            if *target == id || slot.room.as_deref() != Some(chat.room_id.as_str()) {
                continue;
            }
            if let Err(e) = slot.sender.send(frame.clone()) {
                tracing::warn!("Failed to push message to {}: {}", target, e);
            } else {
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of connected clients
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Number of clients currently in `room_id`
    pub async fn room_client_count(&self, room_id: &str) -> u64 {
        count_in_room(&*self.clients.lock().await, room_id)
    }
}

fn count_in_room(clients: &HashMap<ConnectionId, ClientSlot>, room_id: &str) -> u64 {
    clients
        .values()
        .filter(|slot| slot.room.as_deref() == Some(room_id))
        .count() as u64
}

fn broadcast_room_count(clients: &HashMap<ConnectionId, ClientSlot>, room_id: String) {
    let client_count = count_in_room(clients, &room_id);
    broadcast(
        clients,
        &ServerEvent::RoomClientCount(RoomClientCount {
            room_id,
            client_count,
        }),
    );
}

/// Push an event to every client; individual failures are tolerated
fn broadcast(clients: &HashMap<ConnectionId, ClientSlot>, event: &ServerEvent) {
    let Some(frame) = encode(event) else {
        return;
    };
    for (target, slot) in clients {
        if let Err(e) = slot.sender.send(frame.clone()) {
            tracing::warn!("Failed to push event to {}: {}", target, e);
        }
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match protocol::encode(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!("Failed to serialize event: {}", e);
            None
        }
    }
}
