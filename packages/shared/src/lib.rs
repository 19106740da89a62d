//! Shared utilities for Hiroba.
//!
//! - `logger`: tracing subscriber setup for the binaries
//! - `protocol`: JSON wire events exchanged between client and server
//! - `time`: clock abstraction and display formatting

pub mod logger;
pub mod protocol;
pub mod time;
