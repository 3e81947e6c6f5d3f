//! Chat session state machine.
//!
//! A [`ChatSession`] is one room's worth of chat: the merged view, its
//! history cursor, and its live connection. It is the only owner of the
//! connection, so at most one socket exists per session and every teardown
//! path (room switch, retry, shutdown) goes through [`LiveConnection::close`].
//!
//! The session is pure: [`SessionEvent`]s in, [`SessionAction`]s out.
//!
//! # Room lifecycle
//!
//! ```text
//! start / switch_room / retry:
//!   1. close the old socket (handshake only if Connected)
//!   2. reset view: clear buffer, cursor 0, not exhausted, cancel in-flight
//!   3. FetchHistory(seed)
//!   4. Connection(Open)
//! ```
//!
//! Steps 1 to 4 happen in one call, so nothing from the previous room can be
//! merged after the switch: its history completion carries a cancelled
//! request id and its socket events carry a superseded connection id.

use std::time::Duration;

use rand::{SeedableRng, rngs::StdRng};
use turf_proto::{CloseReason, Message, RoomId};

use crate::{
    ConnectionAction, ConnectionId, ConnectionState, HistoryRequest, LiveConnection, PageKind,
    ReconnectPolicy, RequestId, ScrollDirective, ScrollMetrics, SessionError, TransportError,
    ViewConfig, ViewCoordinator,
};

/// Session tuning.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Paging, capacity and scroll thresholds.
    pub view: ViewConfig,
    /// Automatic reconnect schedule (disabled by default).
    pub reconnect: ReconnectPolicy,
    /// Seed for reconnect jitter. `None` seeds from the OS.
    pub jitter_seed: Option<u64>,
}

/// Inputs to the session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A history request finished.
    HistoryLoaded {
        /// Request being completed
        request: RequestId,
        /// Page, oldest first, or the failure
        result: Result<Vec<Message>, TransportError>,
    },

    /// Socket handshake completed.
    ConnectionOpened {
        /// Socket id
        connection: ConnectionId,
    },

    /// Text frame arrived.
    FrameReceived {
        /// Socket id
        connection: ConnectionId,
        /// Raw frame text
        text: String,
    },

    /// Socket closed.
    ConnectionClosed {
        /// Socket id
        connection: ConnectionId,
        /// Close code, `None` if no close frame was received
        code: Option<u16>,
    },

    /// Socket failed to open or errored.
    ConnectionFailed {
        /// Socket id
        connection: ConnectionId,
        /// Error description
        detail: String,
    },

    /// Viewport moved.
    Scrolled(ScrollMetrics),

    /// A scheduled reconnect is due.
    ReconnectDue(ReconnectId),
}

/// Identifies one scheduled reconnect.
///
/// Only the most recently scheduled id is honoured; a timer that outlived a
/// room switch, retry or shutdown is ignored when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReconnectId(u64);

impl ReconnectId {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// User-facing conditions the UI should explain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// Not a member of this room.
    MembershipDenied,
    /// Credential refused.
    Unauthorized,
    /// Connection dropped; chat is read-only until reconnected.
    ConnectionLost,
    /// A history page could not be loaded.
    HistoryUnavailable(TransportError),
}

/// Outputs of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Fetch a history page and report it with
    /// [`SessionEvent::HistoryLoaded`].
    FetchHistory(HistoryRequest),
    /// Socket I/O.
    Connection(ConnectionAction),
    /// Move the viewport.
    Scroll(ScrollDirective),
    /// Connection state changed.
    StateChanged(ConnectionState),
    /// Something the user should be told.
    Notice(SessionNotice),
    /// Emit [`SessionEvent::ReconnectDue`] with `id` after `delay`.
    ScheduleReconnect {
        /// Timer identity to echo back
        id: ReconnectId,
        /// Wait before reconnecting
        delay: Duration,
        /// 1-based attempt number
        attempt: u32,
    },
}

/// One room's chat session.
#[derive(Debug)]
pub struct ChatSession {
    room_id: RoomId,
    view: ViewCoordinator,
    connection: LiveConnection,
    reconnect: ReconnectPolicy,
    attempts: u32,
    reconnect_pending: Option<ReconnectId>,
    next_reconnect: u64,
    rng: StdRng,
}

impl ChatSession {
    /// Create an idle session for `room_id`. Call [`Self::start`] to load
    /// history and connect.
    pub fn new(room_id: RoomId, config: SessionConfig) -> Self {
        let rng = match config.jitter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            view: ViewCoordinator::new(room_id.clone(), config.view),
            room_id,
            connection: LiveConnection::new(),
            reconnect: config.reconnect,
            attempts: 0,
            reconnect_pending: None,
            next_reconnect: 0,
            rng,
        }
    }

    /// Seed history and open the live connection.
    pub fn start(&mut self) -> Vec<SessionAction> {
        self.restart()
    }

    /// Move the session to another room.
    ///
    /// The old room's buffer, cursor, in-flight fetch and socket are torn
    /// down before the new room's seed and connection are requested.
    pub fn switch_room(&mut self, room_id: RoomId) -> Vec<SessionAction> {
        tracing::info!(from = %self.room_id, to = %room_id, "switching room");
        self.room_id = room_id;
        self.attempts = 0;
        self.restart()
    }

    /// Reconnect the current room on request.
    pub fn retry(&mut self) -> Vec<SessionAction> {
        tracing::info!(room = %self.room_id, "retrying room");
        self.attempts = 0;
        self.restart()
    }

    /// Tear down: cancel history, close the socket.
    pub fn shutdown(&mut self) -> Vec<SessionAction> {
        self.view.loader_mut().cancel();
        self.reconnect_pending = None;
        let mut actions = Vec::new();
        self.teardown_connection(&mut actions);
        actions
    }

    /// Send a message on the live connection.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotConnected`] unless connected; nothing is queued
    /// - [`SessionError::InvalidMessage`] for blank or oversized text
    pub fn send(&mut self, text: &str) -> Result<Vec<SessionAction>, SessionError> {
        match self.connection.send(text) {
            Ok(action) => Ok(vec![SessionAction::Connection(action)]),
            Err(e) => {
                tracing::warn!(room = %self.room_id, error = %e, "send rejected");
                Err(e)
            },
        }
    }

    /// Process an event.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::HistoryLoaded { request, result } => self.on_history(request, result),
            SessionEvent::ConnectionOpened { connection } => {
                if !self.connection.on_opened(connection) {
                    return vec![];
                }
                self.attempts = 0;
                vec![SessionAction::StateChanged(ConnectionState::Connected)]
            },
            SessionEvent::FrameReceived { connection, text } => {
                let Some(message) = self.connection.on_text(connection, &text) else {
                    return vec![];
                };
                let (_, directive) = self.view.append_live(message);
                directive.map(SessionAction::Scroll).into_iter().collect()
            },
            SessionEvent::ConnectionClosed { connection, code } => {
                match self.connection.on_closed(connection, code) {
                    Some(reason) => self.on_connection_ended(reason),
                    None => vec![],
                }
            },
            SessionEvent::ConnectionFailed { connection, detail } => {
                match self.connection.on_failed(connection, &detail) {
                    Some(reason) => self.on_connection_ended(reason),
                    None => vec![],
                }
            },
            SessionEvent::Scrolled(metrics) => {
                if !self.view.on_scroll(metrics) {
                    return vec![];
                }
                self.view.begin_backfill().map(SessionAction::FetchHistory).into_iter().collect()
            },
            SessionEvent::ReconnectDue(id) => {
                if self.reconnect_pending != Some(id) {
                    tracing::debug!(room = %self.room_id, timer = id.get(), "stale reconnect timer");
                    return vec![];
                }
                self.restart()
            },
        }
    }

    fn restart(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        self.reconnect_pending = None;
        self.teardown_connection(&mut actions);

        self.view.reset(self.room_id.clone());
        if let Some(request) = self.view.begin_seed() {
            actions.push(SessionAction::FetchHistory(request));
        }

        actions.extend(
            self.connection.open(self.room_id.clone()).into_iter().map(SessionAction::Connection),
        );
        actions.push(SessionAction::StateChanged(ConnectionState::Connecting));
        actions
    }

    fn teardown_connection(&mut self, actions: &mut Vec<SessionAction>) {
        if let Some(action) = self.connection.close() {
            actions.push(SessionAction::Connection(action));
            actions.push(SessionAction::StateChanged(self.connection.state()));
        }
    }

    fn on_history(
        &mut self,
        request: RequestId,
        result: Result<Vec<Message>, TransportError>,
    ) -> Vec<SessionAction> {
        let Some(kind) = self.view.loader_mut().finish(request) else {
            return vec![];
        };

        match (kind, result) {
            (PageKind::Seed, Ok(page)) => {
                tracing::debug!(room = %self.room_id, len = page.len(), "seeded history");
                vec![SessionAction::Scroll(self.view.seed_history(page))]
            },
            (PageKind::Backfill, Ok(page)) => {
                tracing::debug!(room = %self.room_id, len = page.len(), "backfilled history");
                self.view.prepend_history(page).map(SessionAction::Scroll).into_iter().collect()
            },
            (kind, Err(e)) => {
                tracing::warn!(room = %self.room_id, ?kind, error = %e, "history fetch failed");
                vec![SessionAction::Notice(SessionNotice::HistoryUnavailable(e))]
            },
        }
    }

    fn on_connection_ended(&mut self, reason: CloseReason) -> Vec<SessionAction> {
        let mut actions = vec![SessionAction::StateChanged(self.connection.state())];

        let notice = match reason {
            CloseReason::MembershipDenied => SessionNotice::MembershipDenied,
            CloseReason::Unauthorized => SessionNotice::Unauthorized,
            CloseReason::Normal | CloseReason::Other(_) | CloseReason::Abnormal => {
                SessionNotice::ConnectionLost
            },
        };
        actions.push(SessionAction::Notice(notice));

        if let Some(delay) = self.reconnect.next_delay(reason, self.attempts, &mut self.rng) {
            self.attempts += 1;
            let id = ReconnectId(self.next_reconnect);
            self.next_reconnect += 1;
            self.reconnect_pending = Some(id);
            tracing::info!(room = %self.room_id, attempt = self.attempts, ?delay, "scheduling reconnect");
            actions.push(SessionAction::ScheduleReconnect { id, delay, attempt: self.attempts });
        }
        actions
    }

    /// Current room.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Live connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Merged view.
    pub fn view(&self) -> &ViewCoordinator {
        &self.view
    }

    /// Messages oldest first.
    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.view.buffer().iter()
    }

    /// A history page is being fetched.
    pub fn is_loading_history(&self) -> bool {
        self.view.loader().is_loading()
    }

    /// Whether a reconnect is scheduled.
    pub fn is_reconnect_pending(&self) -> bool {
        self.reconnect_pending.is_some()
    }
}
