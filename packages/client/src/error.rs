//! Error types for the session client.

use thiserror::Error;

use crate::{domain::ValueObjectError, transport::TransportError};

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Room identifier failed validation
    #[error("Invalid room id: {0}")]
    InvalidRoomId(#[from] ValueObjectError),

    /// The transport could not take the outbound event
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
