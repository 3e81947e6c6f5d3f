//! Live connection frames.
//!
//! Inbound frames are JSON objects with a `type` discriminator. Only the
//! `"message"` variant carries chat content; everything else (presence,
//! online counts) is surfaced as [`InboundFrame::Other`] so the caller can
//! ignore it.
//!
//! Outbound frames contain only the trimmed `body`. The server assigns `id`,
//! `sender_id` and `created_at`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FrameError, Message};

/// Discriminator value of chat message frames.
pub const MESSAGE_KIND: &str = "message";

/// Maximum outbound body length in characters.
pub const MAX_BODY_CHARS: usize = 2000;

/// Decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A chat message pushed to the room.
    Message(Message),

    /// Any other discriminator.
    Other {
        /// Value of the `type` field.
        kind: String,
    },
}

impl InboundFrame {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// - [`FrameError::Malformed`] if the text is not JSON or a message frame
    ///   does not match the [`Message`] shape
    /// - [`FrameError::MissingKind`] if there is no string `type` field
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text)?;
        let kind = value.get("type").and_then(Value::as_str).ok_or(FrameError::MissingKind)?;

        if kind != MESSAGE_KIND {
            return Ok(Self::Other { kind: kind.to_owned() });
        }

        let message = Message::deserialize(value)?;
        Ok(Self::Message(message))
    }
}

/// Frame sent to the server to post a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundFrame {
    body: String,
}

impl OutboundFrame {
    /// Build a send frame from user input.
    ///
    /// # Errors
    ///
    /// - [`FrameError::EmptyBody`] if `text` is blank
    /// - [`FrameError::BodyTooLong`] if the trimmed text exceeds
    ///   [`MAX_BODY_CHARS`]
    pub fn new(text: &str) -> Result<Self, FrameError> {
        let body = text.trim();
        if body.is_empty() {
            return Err(FrameError::EmptyBody);
        }

        let len = body.chars().count();
        if len > MAX_BODY_CHARS {
            return Err(FrameError::BodyTooLong { len, max: MAX_BODY_CHARS });
        }

        Ok(Self { body: body.to_owned() })
    }

    /// Trimmed message body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Encode as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Malformed`] if serialization fails.
    pub fn encode(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string(self)?)
    }
}
