//! Interactive command-line front-end.
//!
//! Stands in for the router and UI layers: it joins the room given on the
//! command line (or via `/join`) and renders transcript and counts as they
//! change.

mod command;
mod formatter;
mod runner;
mod ui;

pub use runner::run_client;
