//! Error types for the chat core.
//!
//! [`SessionError`] is returned synchronously to the caller (a send that
//! cannot happen). [`TransportError`] describes a failed history fetch; the
//! session recovers from it locally and only reports it as a notice.

use thiserror::Error;

use crate::ConnectionState;

/// Errors returned by session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Send attempted while the live connection is not open. The message is
    /// not queued.
    #[error("not connected: cannot send while {state:?}")]
    NotConnected {
        /// Connection state at the time of the attempt
        state: ConnectionState,
    },

    /// Message text cannot be sent (blank or too long).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// History fetch failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint could not be reached.
    #[error("history endpoint unreachable: {0}")]
    Unreachable(String),

    /// Endpoint answered with a non-success status.
    #[error("history endpoint returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body was not a list of messages.
    #[error("invalid history response: {0}")]
    Decode(String),
}
