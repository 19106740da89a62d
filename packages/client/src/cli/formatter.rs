//! Message formatting utilities for client display.

use crate::{
    domain::{ChatEntry, Role},
    transport::ConnectionState,
};

const RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a transcript entry
    ///
    /// Messages from the server are framed; the local echo only shows when
    /// it was sent since the user just typed the text.
    pub fn format_entry(entry: &ChatEntry) -> String {
        match entry.role {
            Role::Server => format!(
                "\n\n{RULE}\n{}\nsent at {}\n{RULE}\n",
                entry.message, entry.timestamp
            ),
            Role::User => format!("sent at {}\n", entry.timestamp),
        }
    }

    /// Format the counters line
    ///
    /// # Arguments
    ///
    /// * `total` - Clients connected to the server
    /// * `room` - Clients in the current room, if a room is joined
    pub fn format_counts(total: u64, room: Option<u64>) -> String {
        match room {
            Some(room) => format!("\n* {} online, {} in this room\n", total, room),
            None => format!("\n* {} online\n", total),
        }
    }

    /// Format the notice shown after switching rooms
    pub fn format_room_joined(room_id: &str) -> String {
        format!("\n============================================================\nJoined #{}\n============================================================\n", room_id)
    }

    /// Format a connection state change
    pub fn format_connection_state(state: ConnectionState) -> Option<String> {
        let text = match state {
            ConnectionState::Uninitialized => return None,
            ConnectionState::Connecting => "connecting...",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "connection lost, reconnecting...",
            ConnectionState::Closed => "connection closed",
        };
        Some(format!("\n[{}]\n", text))
    }

    /// Format the help text
    pub fn format_help() -> String {
        "\nCommands:\n  /join <room>  switch to another room\n  /clear        clear the transcript\n  /help         show this help\n  /quit         leave\n".to_string()
    }

    /// Format an error for the user
    pub fn format_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }
}
