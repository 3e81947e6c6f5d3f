//! Live connection state machine.
//!
//! Tracks one room's push connection and classifies what arrives on it. Uses
//! the action pattern: methods return [`ConnectionAction`]s for the driver to
//! execute and never touch a socket themselves.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  open   ┌────────────┐  opened   ┌───────────┐
//! │ Disconnected │────────>│ Connecting │──────────>│ Connected │
//! └──────────────┘         └────────────┘           └───────────┘
//!        ↑                       │  close 4403           │
//!        │                       ↓                       │
//!        │               ┌─────────────────┐  close 4403 │
//!        │               │ ClosedForbidden │<────────────┤
//!        │               └─────────────────┘             │
//!        └───────────────────────────────────────────────┘
//!                       any other close / error
//! ```
//!
//! There is no automatic transition out of `Disconnected` or
//! `ClosedForbidden`; reopening is an explicit [`LiveConnection::open`].
//!
//! Each `open` issues a fresh [`ConnectionId`]. Events tagged with any other
//! id belong to a superseded socket and are ignored.

use turf_proto::{CloseReason, InboundFrame, Message, OutboundFrame, RoomId};

use crate::SessionError;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live connection.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Open; sends are allowed.
    Connected,
    /// Server refused membership in the room.
    ClosedForbidden,
}

/// Identifies one opened socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// I/O the driver performs on behalf of the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open a socket for `room_id`. Report its events with `id`.
    Open {
        /// Id to tag this socket's events with
        id: ConnectionId,
        /// Room to subscribe to
        room_id: RoomId,
    },
    /// Send a frame on the open socket.
    Send {
        /// Target socket
        id: ConnectionId,
        /// Frame to send
        frame: OutboundFrame,
    },
    /// Close an open socket with a close handshake.
    Close {
        /// Socket to close
        id: ConnectionId,
    },
    /// Drop a socket that never finished opening, without a close handshake.
    Discard {
        /// Socket to drop
        id: ConnectionId,
    },
}

/// Live connection for one room session.
#[derive(Debug, Clone)]
pub struct LiveConnection {
    state: ConnectionState,
    current: Option<ConnectionId>,
    next_id: u64,
}

impl LiveConnection {
    /// Create a connection in [`ConnectionState::Disconnected`].
    pub fn new() -> Self {
        Self { state: ConnectionState::Disconnected, current: None, next_id: 0 }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Id of the socket currently tracked.
    pub fn current(&self) -> Option<ConnectionId> {
        self.current
    }

    /// Open a connection to `room_id`, tearing down any existing one first.
    pub fn open(&mut self, room_id: RoomId) -> Vec<ConnectionAction> {
        let mut actions: Vec<ConnectionAction> = self.close().into_iter().collect();

        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.current = Some(id);
        self.state = ConnectionState::Connecting;

        tracing::debug!(room = %room_id, connection = id.get(), "opening live connection");
        actions.push(ConnectionAction::Open { id, room_id });
        actions
    }

    /// Handshake completed. Returns `false` for a stale id.
    pub fn on_opened(&mut self, id: ConnectionId) -> bool {
        if !self.is_current(id) || self.state != ConnectionState::Connecting {
            return false;
        }
        self.state = ConnectionState::Connected;
        tracing::info!(connection = id.get(), "live connection open");
        true
    }

    /// Classify a text frame.
    ///
    /// Returns the message for chat frames. Other discriminators, malformed
    /// frames and stale ids yield `None`; the connection stays open.
    pub fn on_text(&self, id: ConnectionId, text: &str) -> Option<Message> {
        if !self.is_current(id) {
            return None;
        }

        match InboundFrame::decode(text) {
            Ok(InboundFrame::Message(message)) => Some(message),
            Ok(InboundFrame::Other { kind }) => {
                tracing::trace!(connection = id.get(), %kind, "ignoring non-message frame");
                None
            },
            Err(e) => {
                tracing::warn!(connection = id.get(), error = %e, "dropping malformed frame");
                None
            },
        }
    }

    /// Socket closed with `code` (`None` when no close frame arrived).
    ///
    /// Returns the classified reason, or `None` for a stale id.
    pub fn on_closed(&mut self, id: ConnectionId, code: Option<u16>) -> Option<CloseReason> {
        if !self.is_current(id) {
            return None;
        }

        let reason = CloseReason::from_code(code);
        self.current = None;
        self.state = match reason {
            CloseReason::MembershipDenied => ConnectionState::ClosedForbidden,
            _ => ConnectionState::Disconnected,
        };
        tracing::info!(connection = id.get(), ?code, ?reason, "live connection closed");
        Some(reason)
    }

    /// Socket failed (handshake error, I/O error).
    ///
    /// Returns `None` for a stale id.
    pub fn on_failed(&mut self, id: ConnectionId, detail: &str) -> Option<CloseReason> {
        if !self.is_current(id) {
            return None;
        }
        self.current = None;
        self.state = ConnectionState::Disconnected;
        tracing::warn!(connection = id.get(), %detail, "live connection failed");
        Some(CloseReason::Abnormal)
    }

    /// Build a send for `text`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotConnected`] unless [`ConnectionState::Connected`]
    /// - [`SessionError::InvalidMessage`] if the text is blank or too long
    pub fn send(&self, text: &str) -> Result<ConnectionAction, SessionError> {
        let id = match (self.state, self.current) {
            (ConnectionState::Connected, Some(id)) => id,
            (state, _) => return Err(SessionError::NotConnected { state }),
        };

        let frame =
            OutboundFrame::new(text).map_err(|e| SessionError::InvalidMessage(e.to_string()))?;
        Ok(ConnectionAction::Send { id, frame })
    }

    /// Tear down the tracked socket.
    ///
    /// An open socket gets a close handshake; a socket still connecting is
    /// discarded silently so no close handler fires for a socket that never
    /// opened. The state becomes `Disconnected` unless it was
    /// `ClosedForbidden`.
    pub fn close(&mut self) -> Option<ConnectionAction> {
        let id = self.current.take()?;
        let action = match self.state {
            ConnectionState::Connected => ConnectionAction::Close { id },
            _ => ConnectionAction::Discard { id },
        };
        if self.state != ConnectionState::ClosedForbidden {
            self.state = ConnectionState::Disconnected;
        }
        Some(action)
    }

    fn is_current(&self, id: ConnectionId) -> bool {
        if self.current == Some(id) {
            return true;
        }
        tracing::trace!(connection = id.get(), "ignoring event from superseded connection");
        false
    }
}

impl Default for LiveConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomId {
        RoomId::new("r").unwrap()
    }

    fn opened() -> (LiveConnection, ConnectionId) {
        let mut conn = LiveConnection::new();
        let actions = conn.open(room());
        let [ConnectionAction::Open { id, .. }] = actions.as_slice() else {
            panic!("expected single open action: {actions:?}");
        };
        let id = *id;
        assert!(conn.on_opened(id));
        (conn, id)
    }

    #[test]
    fn open_then_opened_is_connected() {
        let (conn, _) = opened();
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[test]
    fn membership_close_is_forbidden() {
        let (mut conn, id) = opened();
        assert_eq!(conn.on_closed(id, Some(4403)), Some(CloseReason::MembershipDenied));
        assert_eq!(conn.state(), ConnectionState::ClosedForbidden);
    }

    #[test]
    fn other_close_is_disconnected() {
        let (mut conn, id) = opened();
        assert_eq!(conn.on_closed(id, Some(1006)), Some(CloseReason::Other(1006)));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn unauthorized_close_is_disconnected() {
        let (mut conn, id) = opened();
        assert_eq!(conn.on_closed(id, Some(4401)), Some(CloseReason::Unauthorized));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn malformed_frame_keeps_connection() {
        let (conn, id) = opened();
        assert_eq!(conn.on_text(id, "{oops"), None);
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[test]
    fn send_requires_connected() {
        let mut conn = LiveConnection::new();
        assert_eq!(
            conn.send("hi"),
            Err(SessionError::NotConnected { state: ConnectionState::Disconnected })
        );

        let _ = conn.open(room());
        assert_eq!(
            conn.send("hi"),
            Err(SessionError::NotConnected { state: ConnectionState::Connecting })
        );
    }

    #[test]
    fn send_rejects_blank_text() {
        let (conn, _) = opened();
        assert!(matches!(conn.send("   "), Err(SessionError::InvalidMessage(_))));
    }

    #[test]
    fn close_only_handshakes_when_connected() {
        let mut connecting = LiveConnection::new();
        let _ = connecting.open(room());
        assert!(matches!(connecting.close(), Some(ConnectionAction::Discard { .. })));

        let (mut conn, id) = opened();
        assert_eq!(conn.close(), Some(ConnectionAction::Close { id }));
        assert_eq!(conn.close(), None);
    }

    #[test]
    fn reopen_supersedes_old_socket() {
        let (mut conn, old) = opened();
        let actions = conn.open(room());

        assert!(matches!(actions.first(), Some(ConnectionAction::Close { id }) if *id == old));
        assert_eq!(conn.on_closed(old, Some(1000)), None);
        assert_eq!(conn.state(), ConnectionState::Connecting);
    }
}
