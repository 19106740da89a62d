//! Inbound event dispatch.
//!
//! Each server event becomes exactly one mutation of [`SessionState`]:
//!
//! | event               | mutation                                              |
//! |---------------------|-------------------------------------------------------|
//! | `client_count`      | overwrite `total_client_count`                        |
//! | `room_client_count` | overwrite `room_client_count` if it is the current room |
//! | `chat_message`      | append a `Server` entry to `chat_history`             |
//!
//! Redelivered events are applied again; there is no de-duplication.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use hiroba_shared::{
    protocol::{self, IncomingChat, ProtocolError, ServerEvent},
    time::TimeDisplay,
};

use crate::{domain::ChatEntry, state::SessionState};

/// Errors raised while dispatching an inbound frame
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Frame did not match any known event schema
    #[error(transparent)]
    Malformed(#[from] ProtocolError),
}

/// Result of applying one inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    TotalClientCount(u64),
    RoomClientCount(u64),
    /// Room count for a room other than the current one
    ForeignRoomCount { room_id: String },
    ChatEntry(ChatEntry),
}

/// Applies server events to the session state
pub struct Dispatcher {
    state: Arc<watch::Sender<SessionState>>,
    time_display: TimeDisplay,
}

impl Dispatcher {
    pub fn new(state: Arc<watch::Sender<SessionState>>, time_display: TimeDisplay) -> Self {
        Self {
            state,
            time_display,
        }
    }

    /// Decode a text frame and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Malformed`] if the frame is not a valid server
    /// event. The state is left untouched in that case.
    pub fn dispatch_frame(&self, frame: &str) -> Result<Dispatched, DispatchError> {
        let event: ServerEvent = protocol::decode(frame)?;
        Ok(self.apply(event))
    }

    /// Apply a decoded server event
    pub fn apply(&self, event: ServerEvent) -> Dispatched {
        match event {
            ServerEvent::ClientCount(count) => {
                self.state
                    .send_if_modified(|state| state.set_total_client_count(count));
                Dispatched::TotalClientCount(count)
            }
            ServerEvent::RoomClientCount(payload) => {
                let applied = self.state.send_if_modified(|state| {
                    state.apply_room_client_count(&payload.room_id, payload.client_count)
                });
                if applied {
                    Dispatched::RoomClientCount(payload.client_count)
                } else {
                    tracing::debug!(
                        "Discarding client count for room '{}' (not the current room)",
                        payload.room_id
                    );
                    Dispatched::ForeignRoomCount {
                        room_id: payload.room_id,
                    }
                }
            }
            ServerEvent::ChatMessage(chat) => {
                let entry = self.server_entry(chat);
                self.state.send_modify(|state| state.push_entry(entry.clone()));
                Dispatched::ChatEntry(entry)
            }
        }
    }

    fn server_entry(&self, chat: IncomingChat) -> ChatEntry {
        let timestamp = match chat.timestamp.to_datetime() {
            Some(instant) => self.time_display.render(instant),
            None => {
                tracing::debug!("Unparseable server timestamp: {:?}", chat.timestamp);
                chat.timestamp.raw()
            }
        };
        ChatEntry::from_server(chat.message, timestamp)
    }
}
