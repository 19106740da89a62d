//! WebSocket wire protocol shared by the client and the server.
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`.
//!
//! | direction        | event               | data                          |
//! |------------------|---------------------|-------------------------------|
//! | client → server  | `join_room`         | room id (string)              |
//! | client → server  | `chat_message`      | `{room_id, message}`          |
//! | server → client  | `client_count`      | integer                       |
//! | server → client  | `room_client_count` | `{room_id, client_count}`     |
//! | server → client  | `chat_message`      | `{message, timestamp}`        |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{from_epoch_millis, parse_timestamp};

/// Protocol encode/decode errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame could not be serialized
    #[error("Failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),

    /// Frame is not a well-formed event
    #[error("Malformed event payload: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Events sent from the client to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(String),
    ChatMessage(OutgoingChat),
}

/// Chat message sent by a client to its room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingChat {
    pub room_id: String,
    pub message: String,
}

/// Events pushed from the server to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ClientCount(u64),
    RoomClientCount(RoomClientCount),
    ChatMessage(IncomingChat),
}

/// Participant count of one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomClientCount {
    pub room_id: String,
    pub client_count: u64,
}

/// Chat message relayed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingChat {
    pub message: String,
    #[serde(default)]
    pub timestamp: WireTimestamp,
}

/// Server-supplied event time.
///
/// Never rejects a value: whatever the server sends is kept so the message
/// itself is not lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    /// Whole Unix milliseconds
    EpochMillis(i64),
    /// Any other number, e.g. fractional milliseconds
    EpochNumber(serde_json::Number),
    /// ISO-8601 text
    Text(String),
    /// `null`, a missing field or anything else
    Other(serde_json::Value),
}

impl Default for WireTimestamp {
    fn default() -> Self {
        WireTimestamp::Other(serde_json::Value::Null)
    }
}

impl WireTimestamp {
    /// Interpret the timestamp as a UTC instant, if it is valid
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            WireTimestamp::EpochMillis(millis) => from_epoch_millis(*millis),
            WireTimestamp::EpochNumber(number) => number
                .as_f64()
                .filter(|millis| millis.is_finite())
                .and_then(|millis| from_epoch_millis(millis.trunc() as i64)),
            WireTimestamp::Text(text) => parse_timestamp(text),
            WireTimestamp::Other(_) => None,
        }
    }

    /// The timestamp as it was received, for display when it cannot be parsed.
    /// An absent timestamp renders as an empty string.
    pub fn raw(&self) -> String {
        match self {
            WireTimestamp::EpochMillis(millis) => millis.to_string(),
            WireTimestamp::EpochNumber(number) => number.to_string(),
            WireTimestamp::Text(text) => text.clone(),
            WireTimestamp::Other(serde_json::Value::Null) => String::new(),
            WireTimestamp::Other(value) => value.to_string(),
        }
    }
}

/// Serialize an event into a text frame
pub fn encode<T: Serialize>(event: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(ProtocolError::Encode)
}

/// Parse a text frame into an event
pub fn decode<'a, T: Deserialize<'a>>(frame: &'a str) -> Result<T, ProtocolError> {
    serde_json::from_str(frame).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_join_room() {
        // テスト項目: join_room イベントがルーム ID 文字列をデータとしてエンコードされる
        // given (前提条件):
        let event = ClientEvent::JoinRoom("lobby".to_string());

        // when (操作):
        let frame = encode(&event).unwrap();

        // then (期待する結果):
        assert_eq!(frame, r#"{"event":"join_room","data":"lobby"}"#);
    }

    #[test]
    fn test_encode_chat_message() {
        // テスト項目: chat_message イベントが room_id と message を持つ
        // given (前提条件):
        let event = ClientEvent::ChatMessage(OutgoingChat {
            room_id: "lobby".to_string(),
            message: "hi".to_string(),
        });

        // when (操作):
        let frame = encode(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            frame,
            r#"{"event":"chat_message","data":{"room_id":"lobby","message":"hi"}}"#
        );
    }

    #[test]
    fn test_decode_client_count() {
        // テスト項目: client_count イベントが整数としてデコードされる
        // given (前提条件):
        let frame = r#"{"event":"client_count","data":7}"#;

        // when (操作):
        let event: ServerEvent = decode(frame).unwrap();

        // then (期待する結果):
        assert_eq!(event, ServerEvent::ClientCount(7));
    }

    #[test]
    fn test_decode_room_client_count() {
        // テスト項目: room_client_count イベントがルーム ID と人数を持つ
        // given (前提条件):
        let frame = r#"{"event":"room_client_count","data":{"room_id":"A","client_count":2}}"#;

        // when (操作):
        let event: ServerEvent = decode(frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ServerEvent::RoomClientCount(RoomClientCount {
                room_id: "A".to_string(),
                client_count: 2,
            })
        );
    }

    #[test]
    fn test_decode_chat_message_with_text_and_epoch_timestamps() {
        // テスト項目: chat_message のタイムスタンプは文字列とエポックミリ秒の両方を受け付ける
        // given (前提条件):
        let text_frame = r#"{"event":"chat_message","data":{"message":"hello","timestamp":"2023-01-01T00:00:00+00:00"}}"#;
        let epoch_frame =
            r#"{"event":"chat_message","data":{"message":"hello","timestamp":1672531200000}}"#;

        // when (操作):
        let text_event: ServerEvent = decode(text_frame).unwrap();
        let epoch_event: ServerEvent = decode(epoch_frame).unwrap();

        // then (期待する結果):
        let (ServerEvent::ChatMessage(text_chat), ServerEvent::ChatMessage(epoch_chat)) =
            (text_event, epoch_event)
        else {
            panic!("expected chat messages");
        };
        assert_eq!(text_chat.timestamp.to_datetime(), epoch_chat.timestamp.to_datetime());
        assert!(text_chat.timestamp.to_datetime().is_some());
    }

    #[test]
    fn test_decode_rejects_negative_count() {
        // テスト項目: 負の人数は不正なペイロードとして拒否される
        // given (前提条件):
        let frame = r#"{"event":"client_count","data":-1}"#;

        // when (操作):
        let result = decode::<ServerEvent>(frame);

        // then (期待する結果):
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        // テスト項目: 必須フィールドが欠けたペイロードは拒否される
        // given (前提条件):
        let frame = r#"{"event":"room_client_count","data":{"client_count":2}}"#;

        // when (操作):
        let result = decode::<ServerEvent>(frame);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_wire_timestamp_raw_keeps_original_text() {
        // テスト項目: 解釈できないタイムスタンプでも元の文字列を保持する
        // given (前提条件):
        let timestamp = WireTimestamp::Text("not a date".to_string());

        // when (操作):
        let parsed = timestamp.to_datetime();

        // then (期待する結果):
        assert!(parsed.is_none());
        assert_eq!(timestamp.raw(), "not a date");
    }

    #[test]
    fn test_decode_chat_message_with_fractional_epoch() {
        // テスト項目: 小数のエポックミリ秒も受け付け、ミリ秒未満は切り捨てられる
        // given (前提条件):
        let frame =
            r#"{"event":"chat_message","data":{"message":"hello","timestamp":1672531200000.5}}"#;

        // when (操作):
        let event: ServerEvent = decode(frame).unwrap();

        // then (期待する結果):
        let ServerEvent::ChatMessage(chat) = event else {
            panic!("expected a chat message");
        };
        assert_eq!(chat.message, "hello");
        assert_eq!(chat.timestamp.to_datetime(), from_epoch_millis(1_672_531_200_000));
    }

    #[test]
    fn test_decode_chat_message_with_missing_or_odd_timestamp() {
        // テスト項目: タイムスタンプが欠けていても null やオブジェクトでもメッセージはデコードされる
        // given (前提条件):
        let missing = r#"{"event":"chat_message","data":{"message":"a"}}"#;
        let null = r#"{"event":"chat_message","data":{"message":"b","timestamp":null}}"#;
        let object = r#"{"event":"chat_message","data":{"message":"c","timestamp":{"at":1}}}"#;

        // when (操作):
        let timestamps: Vec<WireTimestamp> = [missing, null, object]
            .into_iter()
            .map(|frame| match decode::<ServerEvent>(frame).unwrap() {
                ServerEvent::ChatMessage(chat) => chat.timestamp,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();

        // then (期待する結果):
        assert!(timestamps.iter().all(|timestamp| timestamp.to_datetime().is_none()));
        assert_eq!(timestamps[0].raw(), "");
        assert_eq!(timestamps[1].raw(), "");
        assert_eq!(timestamps[2].raw(), r#"{"at":1}"#);
    }
}
