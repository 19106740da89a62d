//! Connection manager.
//!
//! Owns the single transport connection of a session. The first call to
//! [`ConnectionManager::get`] opens it and binds the dispatcher to its
//! inbound stream; later calls return the same handle without rebinding.

use std::sync::{Arc, OnceLock};

use tokio::sync::{mpsc, watch};

use hiroba_shared::protocol::ClientEvent;

use crate::{
    config::ClientConfig,
    dispatcher::Dispatcher,
    state::SessionState,
    transport::{
        Connection, ConnectionState, Connector, Handshake, Transport, TransportEvent,
    },
};

pub struct ConnectionManager {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    dispatcher: Arc<Dispatcher>,
    state: Arc<watch::Sender<SessionState>>,
    connection_state: Arc<watch::Sender<ConnectionState>>,
    transport: OnceLock<Arc<dyn Transport>>,
}

impl ConnectionManager {
    pub fn new(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        dispatcher: Arc<Dispatcher>,
        state: Arc<watch::Sender<SessionState>>,
        connection_state: Arc<watch::Sender<ConnectionState>>,
    ) -> Self {
        Self {
            config,
            connector,
            dispatcher,
            state,
            connection_state,
            transport: OnceLock::new(),
        }
    }

    /// Return the session's connection, opening it on first use.
    ///
    /// # Panics
    ///
    /// The first call panics if made outside of a Tokio runtime.
    pub fn get(&self) -> Arc<dyn Transport> {
        self.transport.get_or_init(|| self.open()).clone()
    }

    fn open(&self) -> Arc<dyn Transport> {
        tracing::info!("Opening connection to {}", self.config.backend_url);
        self.connection_state
            .send_replace(ConnectionState::Connecting);

        let Connection { transport, events } = self.connector.connect(
            &self.config.backend_url,
            self.config.reconnect,
            rejoin_handshake(self.state.clone()),
        );

        tokio::spawn(bind_events(
            events,
            self.dispatcher.clone(),
            self.connection_state.clone(),
        ));

        transport
    }
}

/// The server forgets room membership when a socket drops, so a reconnected
/// transport announces the current room before sending anything else.
fn rejoin_handshake(state: Arc<watch::Sender<SessionState>>) -> Handshake {
    Arc::new(move || {
        let room = state.borrow().current_room_id().map(|room| room.as_str().to_string());
        if let Some(room) = &room {
            tracing::info!("Rejoining room '{}' after reconnect", room);
        }
        room.map(ClientEvent::JoinRoom).into_iter().collect()
    })
}

/// Drive the dispatcher from the transport's event stream.
///
/// Holds no reference to the transport, so dropping the session closes the
/// connection.
async fn bind_events(
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    dispatcher: Arc<Dispatcher>,
    connection_state: Arc<watch::Sender<ConnectionState>>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Connected => {
                connection_state.send_replace(ConnectionState::Connected);
            }
            TransportEvent::Disconnected { reason, will_retry } => {
                tracing::warn!("Disconnected from server: {}", reason);
                let next = if will_retry {
                    ConnectionState::Reconnecting
                } else {
                    ConnectionState::Closed
                };
                connection_state.send_replace(next);
            }
            TransportEvent::Frame(frame) => {
                if let Err(e) = dispatcher.dispatch_frame(&frame) {
                    tracing::warn!("Dropping inbound frame: {}", e);
                }
            }
        }
    }

    tracing::debug!("Transport event stream ended");
}
