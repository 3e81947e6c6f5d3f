//! Room identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RoomIdError;

/// Opaque room key.
///
/// Group rooms use server-issued ids; direct-message rooms use the composite
/// key built by [`RoomId::direct`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Validate and wrap a room key. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`RoomIdError::Empty`] if the key is blank.
    pub fn new(id: impl AsRef<str>) -> Result<Self, RoomIdError> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(RoomIdError::Empty);
        }
        Ok(Self(id.to_owned()))
    }

    /// Direct-message room shared by two users.
    ///
    /// The ids are sorted so both participants derive the same key.
    ///
    /// # Errors
    ///
    /// Returns [`RoomIdError::Empty`] if either user id is blank.
    pub fn direct(user_a: &str, user_b: &str) -> Result<Self, RoomIdError> {
        let (a, b) = (user_a.trim(), user_b.trim());
        if a.is_empty() || b.is_empty() {
            return Err(RoomIdError::Empty);
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self(format!("{lo}_{hi}")))
    }

    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RoomId {
    type Err = RoomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Entry of the caller's room list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room key.
    pub id: RoomId,
    /// Human readable name.
    pub name: String,
    /// Group room (as opposed to a direct conversation).
    #[serde(default)]
    pub is_group: bool,
}
