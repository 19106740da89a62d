//! Observable session state.
//!
//! `SessionState` mirrors what the server has told us plus the locally
//! echoed transcript. It is a plain value; the session publishes it through
//! a `tokio::sync::watch` channel so readers see every change once the
//! mutating call or inbound event has been applied.

use serde::Serialize;

use crate::domain::{ChatEntry, RoomId};

/// Facts the presentation layer reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    total_client_count: u64,
    room_client_count: u64,
    chat_history: Vec<ChatEntry>,
    current_room_id: Option<RoomId>,
}

impl SessionState {
    /// Number of clients connected to the whole server
    pub fn total_client_count(&self) -> u64 {
        self.total_client_count
    }

    /// Number of clients in the current room.
    ///
    /// Only meaningful while a room is joined.
    pub fn room_client_count(&self) -> u64 {
        self.room_client_count
    }

    /// Transcript in display order
    pub fn chat_history(&self) -> &[ChatEntry] {
        &self.chat_history
    }

    /// Room the client believes it has joined
    pub fn current_room_id(&self) -> Option<&RoomId> {
        self.current_room_id.as_ref()
    }

    /// Current room id as sent on the wire; empty when no room is joined
    pub fn chat_room_id(&self) -> &str {
        self.current_room_id
            .as_ref()
            .map(RoomId::as_str)
            .unwrap_or_default()
    }

    pub(crate) fn set_total_client_count(&mut self, count: u64) -> bool {
        let changed = self.total_client_count != count;
        self.total_client_count = count;
        changed
    }

    /// Overwrite the room count if `room_id` is the current room.
    ///
    /// Returns `false` when the update belongs to another room and was discarded.
    pub(crate) fn apply_room_client_count(&mut self, room_id: &str, count: u64) -> bool {
        if self.chat_room_id().is_empty() || self.chat_room_id() != room_id {
            return false;
        }
        self.room_client_count = count;
        true
    }

    pub(crate) fn push_entry(&mut self, entry: ChatEntry) {
        self.chat_history.push(entry);
    }

    pub(crate) fn set_current_room(&mut self, room_id: RoomId) {
        self.current_room_id = Some(room_id);
    }

    pub(crate) fn clear_history(&mut self) -> bool {
        let had_entries = !self.chat_history.is_empty();
        self.chat_history.clear();
        had_entries
    }
}
