//! Chat message record.
//!
//! The same record shape is returned by the history endpoint and pushed by
//! the live connection (inside a `"type": "message"` frame). Field names match
//! the JSON keys on the wire.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Opaque message identifier, unique within a room.
///
/// Two messages with the same id are the same logical message regardless of
/// their other fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a server-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MessageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id, the dedup key.
    pub id: MessageId,

    /// Author's user id.
    pub sender_id: String,

    /// Author's handle, when the server resolved it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_handle: Option<String>,

    /// Room the message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,

    /// Message text.
    pub body: String,

    /// Link to an attached file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,

    /// MIME-ish type of the attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_type: Option<String>,

    /// Creation time as an ISO-8601 string. Display only; never used for
    /// ordering.
    pub created_at: String,
}

impl Message {
    /// Name to show next to the message.
    ///
    /// The handle when present, otherwise `user-` plus the first four
    /// characters of the sender id.
    pub fn display_name(&self) -> String {
        match self.sender_handle.as_deref() {
            Some(handle) if !handle.is_empty() => handle.to_owned(),
            _ => {
                let prefix: String = self.sender_id.chars().take(4).collect();
                format!("user-{prefix}")
            },
        }
    }

    /// Upper-cased first character of the handle (or sender id).
    pub fn avatar_initial(&self) -> Option<char> {
        let source = match self.sender_handle.as_deref() {
            Some(handle) if !handle.is_empty() => handle,
            _ => self.sender_id.as_str(),
        };
        source.chars().next().and_then(|c| c.to_uppercase().next())
    }

    /// `HH:MM` taken from `created_at`.
    ///
    /// Returns `None` when the timestamp is not `YYYY-MM-DDTHH:MM...`.
    pub fn time_label(&self) -> Option<&str> {
        let (date, time) = self.created_at.split_once(['T', ' '])?;
        if date.len() != 10 {
            return None;
        }
        let label = time.get(..5)?;
        let bytes = label.as_bytes();
        let well_formed = bytes[2] == b':'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);
        well_formed.then_some(label)
    }

    /// Whether `user_id` authored this message.
    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }
}
