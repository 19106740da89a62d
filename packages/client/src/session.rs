//! Chat session: the public handle the router and UI layers use.

use std::sync::Arc;

use tokio::sync::watch;

use hiroba_shared::{
    protocol::{ClientEvent, OutgoingChat},
    time::{Clock, SystemClock, TimeDisplay},
};

use crate::{
    config::ClientConfig,
    connection::ConnectionManager,
    dispatcher::Dispatcher,
    domain::{ChatEntry, RoomId},
    error::ClientError,
    state::SessionState,
    transport::{ConnectionState, Connector, Transport, WebSocketConnector},
};

/// Handle to one chat session.
///
/// Cloning is cheap and every clone refers to the same connection and
/// state. Dropping the last clone closes the connection.
///
/// ```ignore
/// let session = ChatSession::start(ClientConfig::from_env());
/// session.join_room(RoomId::new("general")?)?;
/// session.send_message("hello")?;
///
/// let mut state = session.subscribe();
/// while state.changed().await.is_ok() {
///     render(&state.borrow());
/// }
/// ```
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    state: Arc<watch::Sender<SessionState>>,
    connection_state: Arc<watch::Sender<ConnectionState>>,
    connections: ConnectionManager,
    clock: Arc<dyn Clock>,
    time_display: TimeDisplay,
}

impl ChatSession {
    /// Create a session without connecting yet
    pub fn new(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        Self::with_clock(config, connector, Arc::new(SystemClock))
    }

    /// Create a session with a custom clock for local timestamps
    pub fn with_clock(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let state = Arc::new(state);
        let (connection_state, _) = watch::channel(ConnectionState::default());
        let connection_state = Arc::new(connection_state);

        let time_display = config.time_display;
        let dispatcher = Arc::new(Dispatcher::new(state.clone(), time_display));
        let connections = ConnectionManager::new(
            config,
            connector,
            dispatcher,
            state.clone(),
            connection_state.clone(),
        );

        Self {
            inner: Arc::new(SessionInner {
                state,
                connection_state,
                connections,
                clock,
                time_display,
            }),
        }
    }

    /// Create a WebSocket session and open its connection right away.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn start(config: ClientConfig) -> Self {
        let session = Self::new(config, Arc::new(WebSocketConnector));
        session.connection();
        session
    }

    /// The session's single connection, opened on first call
    pub fn connection(&self) -> Arc<dyn Transport> {
        self.inner.connections.get()
    }

    /// Join `room_id`.
    ///
    /// The current room changes before this returns, so room counts for the
    /// new room are accepted from then on. History and the previous room's
    /// count are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the join event could not be
    /// queued. The current room is still updated.
    pub fn join_room(&self, room_id: RoomId) -> Result<(), ClientError> {
        tracing::info!("Joining room '{}'", room_id);
        self.inner
            .state
            .send_modify(|state| state.set_current_room(room_id.clone()));

        self.connection()
            .emit(&ClientEvent::JoinRoom(room_id.into_string()))?;
        Ok(())
    }

    /// Send a chat message to the current room.
    ///
    /// Empty messages are ignored. Otherwise the message is echoed into the
    /// transcript immediately and then handed to the transport. With no room
    /// joined it is sent with an empty room id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the event could not be queued.
    /// The local echo stays in the transcript.
    pub fn send_message(&self, message: &str) -> Result<(), ClientError> {
        if message.is_empty() {
            return Ok(());
        }

        let timestamp = self.inner.time_display.render(self.inner.clock.now());
        let entry = ChatEntry::from_user(message.to_string(), timestamp);
        let mut room_id = String::new();
        self.inner.state.send_modify(|state| {
            room_id = state.chat_room_id().to_string();
            state.push_entry(entry);
        });

        self.connection()
            .emit(&ClientEvent::ChatMessage(OutgoingChat {
                room_id,
                message: message.to_string(),
            }))?;
        Ok(())
    }

    /// Drop the whole transcript, e.g. when the UI switches rooms
    pub fn clear_history(&self) {
        self.inner.state.send_if_modified(SessionState::clear_history);
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn total_client_count(&self) -> u64 {
        self.inner.state.borrow().total_client_count()
    }

    pub fn room_client_count(&self) -> u64 {
        self.inner.state.borrow().room_client_count()
    }

    pub fn chat_history(&self) -> Vec<ChatEntry> {
        self.inner.state.borrow().chat_history().to_vec()
    }

    /// Current room id; empty when no room is joined
    pub fn chat_room_id(&self) -> String {
        self.inner.state.borrow().chat_room_id().to_string()
    }

    /// Subscribe to connection lifecycle changes
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }
}
