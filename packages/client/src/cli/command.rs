//! Parsing of input lines into commands.

use crate::domain::{RoomId, ValueObjectError};

/// What the user asked for on one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to another room
    Join(RoomId),
    /// Send a chat message to the current room
    Say(String),
    /// Clear the local transcript
    Clear,
    /// Show available commands
    Help,
    /// Leave the client
    Quit,
}

/// Errors for lines that look like commands but are not valid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("usage: /join <room>")]
    MissingRoom(#[from] ValueObjectError),

    #[error("unknown command '/{0}' (try /help)")]
    Unknown(String),
}

/// Parse a trimmed input line
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };

    match name {
        "join" => Ok(Command::Join(RoomId::new(argument)?)),
        "clear" => Ok(Command::Clear),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
