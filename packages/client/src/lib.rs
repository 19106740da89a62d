//! Session client for Hiroba, a room-scoped real-time chat.
//!
//! A [`ChatSession`] owns exactly one connection to the backend, joins one
//! room at a time and mirrors what the server pushes (global client count,
//! room client count, transcript) in an observable [`SessionState`].

// core
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod session;
pub mod state;
pub mod transport;

// command-line front-end
pub mod cli;

pub use config::ClientConfig;
pub use domain::{ChatEntry, ReconnectPolicy, Role, RoomId};
pub use error::ClientError;
pub use session::ChatSession;
pub use state::SessionState;
pub use transport::ConnectionState;
