//! Transport capability the session depends on.
//!
//! ## 概要
//!
//! The session never talks to a socket directly. A [`Connector`] opens a
//! [`Connection`], which is an outbound [`Transport`] handle plus the stream
//! of [`TransportEvent`]s coming back from the server. Reconnection belongs
//! to the transport; the session only sees state changes and frames.
//!
//! ## 実装
//!
//! - `websocket`: tokio-tungstenite based implementation

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use hiroba_shared::protocol::{ClientEvent, ProtocolError};

use crate::domain::ReconnectPolicy;

pub mod websocket;

pub use websocket::WebSocketConnector;

/// Errors raised when handing an event to the transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The background connection task has terminated
    #[error("transport is closed")]
    Closed,

    /// The event could not be encoded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Lifecycle of the session's connection as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection has been requested yet
    #[default]
    Uninitialized,
    /// First connection attempt in progress
    Connecting,
    /// Connected to the server
    Connected,
    /// Connection lost; the transport is retrying
    Reconnecting,
    /// The transport gave up
    Closed,
}

/// What the transport reports back to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A connection to the server has been (re)established
    Connected,
    /// The connection was lost or could not be established
    Disconnected { reason: String, will_retry: bool },
    /// A text frame pushed by the server
    Frame(String),
}

/// Outbound half of a connection.
///
/// `emit` is fire-and-forget: success means the event was queued, not that
/// the server received it.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn emit(&self, event: &ClientEvent) -> Result<(), TransportError>;
}

/// An opened connection: the outbound handle and the inbound event stream
pub struct Connection {
    pub transport: Arc<dyn Transport>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Events a reconnected transport writes before anything queued while the
/// server was unreachable. Called once per reconnection.
pub type Handshake = Arc<dyn Fn() -> Vec<ClientEvent> + Send + Sync>;

/// Opens connections to a backend
pub trait Connector: Send + Sync {
    /// Start connecting to `url` and return immediately.
    ///
    /// Establishment happens in the background and is reported through
    /// [`Connection::events`]. `handshake` is not used for the first
    /// connection, only after a reconnect.
    fn connect(
        &self,
        url: &str,
        reconnect: ReconnectPolicy,
        handshake: Handshake,
    ) -> Connection;
}
