//! Domain model of the chat session.

pub mod entry;
pub mod error;
pub mod reconnect;
pub mod room;

pub use entry::{ChatEntry, EntryId, Role};
pub use error::ValueObjectError;
pub use reconnect::ReconnectPolicy;
pub use room::RoomId;
