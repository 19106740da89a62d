//! Room identifier value object.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// Identifier of a server-defined room.
///
/// Always non-empty; "not joined" is modelled as `Option<RoomId>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Create a new RoomId.
    ///
    /// # Errors
    ///
    /// Returns [`ValueObjectError::RoomIdEmpty`] if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValueObjectError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
