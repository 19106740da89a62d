//! Room relay server for Hiroba.
//!
//! Tracks which room each WebSocket connection is in, pushes global and
//! per-room client counts, and relays chat messages to the other members of
//! the sender's room. Nothing is persisted.

pub mod handler;
pub mod hub;
pub mod runner;
pub mod signal;
pub mod state;

pub use runner::{app, run_server, serve};
