//! Chat transcript entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Locally generated identifier of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Who originated a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Received from the server
    Server,
    /// Typed locally and echoed optimistically
    User,
}

/// One item of the chat transcript.
///
/// Entries are immutable once created; the transcript only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub id: EntryId,
    pub role: Role,
    pub message: String,
    /// Display-formatted local time
    pub timestamp: String,
}

impl ChatEntry {
    /// Entry for a message pushed by the server
    pub fn from_server(message: String, timestamp: String) -> Self {
        Self {
            id: EntryId::generate(),
            role: Role::Server,
            message,
            timestamp,
        }
    }

    /// Entry for a message sent by the local user
    pub fn from_user(message: String, timestamp: String) -> Self {
        Self {
            id: EntryId::generate(),
            role: Role::User,
            message,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_get_distinct_ids() {
        // テスト項目: 同じ内容のエントリでも ID は異なる
        // given (前提条件):
        let first = ChatEntry::from_server("hello".to_string(), "t".to_string());

        // when (操作):
        let second = ChatEntry::from_server("hello".to_string(), "t".to_string());

        // then (期待する結果):
        assert_ne!(first.id, second.id);
        assert_ne!(first, second);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        // テスト項目: Role は小文字でシリアライズされる
        // given (前提条件):
        let entry = ChatEntry::from_user("hi".to_string(), "t".to_string());

        // when (操作):
        let json = serde_json::to_value(&entry).unwrap();

        // then (期待する結果):
        assert_eq!(json["role"], "user");
        assert_eq!(json["message"], "hi");
    }
}
