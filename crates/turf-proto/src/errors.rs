//! Error types for wire encoding and decoding.

use thiserror::Error;

/// Errors raised while decoding inbound frames or building outbound ones.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Frame text is not valid JSON, or a `message` frame does not match the
    /// message record shape.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame is a JSON value without a string `type` discriminator.
    #[error("frame has no type discriminator")]
    MissingKind,

    /// Outbound body is empty after trimming.
    #[error("message body is empty")]
    EmptyBody,

    /// Outbound body exceeds the server's length bound.
    #[error("message body too long: {len} chars (max {max})")]
    BodyTooLong {
        /// Body length in characters after trimming.
        len: usize,
        /// Maximum accepted length in characters.
        max: usize,
    },
}

/// Errors raised when constructing a [`crate::RoomId`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomIdError {
    /// Room id is empty or whitespace only.
    #[error("room id is empty")]
    Empty,
}
