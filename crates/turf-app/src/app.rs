//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the chat client decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the [`ChatSession`] for the active room and translates its actions.
//! - Tracks the room list, the input line and the viewport.
//! - Turns session notices into a transient status line.

use std::collections::VecDeque;

use turf_core::{
    ChatSession, ConnectionState, Message, RoomId, ScrollMetrics, SessionAction, SessionConfig,
    SessionError, SessionEvent, SessionNotice, ViewConfig,
};
use turf_proto::RoomSummary;

use crate::{
    AppAction, AppEvent, InputState, KeyInput, Viewport,
    command::{self, Command},
};

/// Terminal rows not available to the chat pane: its two borders, the
/// three-row input box and the status bar.
pub const CHAT_CHROME_ROWS: u16 = 6;

/// Backfill starts when the top visible row is closer than this to the
/// oldest message.
pub const NEAR_TOP_ROWS: u32 = 2;

/// Live messages follow the bottom when the viewer is closer than this to
/// the newest message.
pub const NEAR_BOTTOM_ROWS: u32 = 2;

const DEFAULT_TERMINAL_SIZE: (u16, u16) = (80, 24);

/// View tuning for a row-based viewport.
pub fn row_view_config(page_size: usize, capacity: usize) -> ViewConfig {
    ViewConfig {
        page_size,
        capacity,
        near_top_threshold: NEAR_TOP_ROWS,
        near_bottom_threshold: NEAR_BOTTOM_ROWS,
    }
}

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies.
#[derive(Debug)]
pub struct App {
    /// Active room's chat session.
    session: ChatSession,
    /// Caller's user id, needed for direct rooms and own-message styling.
    user_id: Option<String>,
    /// Rooms from the last room-list fetch.
    rooms: Vec<RoomSummary>,
    /// Input line.
    input: InputState,
    /// Scroll position over the session's messages.
    viewport: Viewport,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create an idle App for `room_id`. Call [`Self::start`] to connect.
    pub fn new(room_id: RoomId, config: SessionConfig, user_id: Option<String>) -> Self {
        Self {
            session: ChatSession::new(room_id, config),
            user_id,
            rooms: Vec::new(),
            input: InputState::new(),
            viewport: Viewport::new(chat_rows(DEFAULT_TERMINAL_SIZE.1)),
            terminal_size: DEFAULT_TERMINAL_SIZE,
            status_message: None,
        }
    }

    /// Load history, open the live connection and fetch the room list.
    pub fn start(&mut self) -> Vec<AppAction> {
        let session_actions = self.session.start();
        let mut actions = self.apply_session(session_actions);
        actions.push(AppAction::LoadRooms);
        actions.push(AppAction::Render);
        actions
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                self.viewport.set_height(chat_rows(rows), self.message_count());
                self.report_scroll()
            },
            AppEvent::Session(event) => {
                let session_actions = self.session.handle(event);
                let mut actions = self.apply_session(session_actions);
                actions.push(AppAction::Render);
                actions
            },
            AppEvent::RoomsLoaded(Ok(rooms)) => {
                self.rooms = rooms;
                vec![AppAction::Render]
            },
            AppEvent::RoomsLoaded(Err(e)) => {
                tracing::warn!(error = %e, "room list unavailable");
                self.status_message = Some(format!("Room list unavailable: {e}"));
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        let page = isize::try_from(self.viewport.height().max(1)).unwrap_or(isize::MAX);
        match key {
            KeyInput::Char(c) => {
                self.input.insert(c);
                vec![AppAction::Render]
            },
            KeyInput::Backspace => {
                self.input.backspace();
                vec![AppAction::Render]
            },
            KeyInput::Delete => {
                self.input.delete();
                vec![AppAction::Render]
            },
            KeyInput::Left => {
                self.input.left();
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.input.right();
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.input.home();
                vec![AppAction::Render]
            },
            KeyInput::Up => self.scroll_by(-1),
            KeyInput::Down => self.scroll_by(1),
            KeyInput::PageUp => self.scroll_by(-page),
            KeyInput::PageDown => self.scroll_by(page),
            KeyInput::End => {
                self.viewport.to_bottom(self.message_count());
                self.report_scroll()
            },
            KeyInput::Tab => self.cycle_room(),
            KeyInput::Enter => self.handle_enter(),
            KeyInput::Esc => self.quit(),
        }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Switch to `room`.
    pub fn join_room(&mut self, room: &str) -> Vec<AppAction> {
        let room_id = match RoomId::new(room) {
            Ok(id) => id,
            Err(e) => {
                self.set_status(format!("/join: {e}"));
                return vec![AppAction::Render];
            },
        };
        if &room_id == self.session.room_id() {
            self.set_status(format!("Already in #{room_id}"));
            return vec![AppAction::Render];
        }

        self.set_status(format!("Joined #{room_id}"));
        let session_actions = self.session.switch_room(room_id);
        self.viewport.to_bottom(0);
        let mut actions = self.apply_session(session_actions);
        actions.push(AppAction::Render);
        actions
    }

    /// Switch to the direct room shared with `user`.
    pub fn open_direct(&mut self, user: &str) -> Vec<AppAction> {
        let Some(me) = self.user_id.clone() else {
            self.set_status("/dm: your user id is unknown (set --user-id)");
            return vec![AppAction::Render];
        };
        match RoomId::direct(&me, user) {
            Ok(room_id) => self.join_room(room_id.as_str()),
            Err(e) => {
                self.set_status(format!("/dm: {e}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Reconnect the current room.
    pub fn retry(&mut self) -> Vec<AppAction> {
        self.set_status(format!("Reconnecting to #{}...", self.session.room_id()));
        let session_actions = self.session.retry();
        self.viewport.to_bottom(0);
        let mut actions = self.apply_session(session_actions);
        actions.push(AppAction::Render);
        actions
    }

    /// Send `text` on the live connection.
    ///
    /// The input line is cleared only when the send is accepted.
    pub fn send_message(&mut self, text: &str) -> Vec<AppAction> {
        match self.session.send(text) {
            Ok(session_actions) => {
                self.input.clear();
                let mut actions = self.apply_session(session_actions);
                actions.push(AppAction::Render);
                actions
            },
            Err(SessionError::NotConnected { state }) => {
                self.set_status(format!("Not sent: connection is {}", state_label(state)));
                vec![AppAction::Render]
            },
            Err(SessionError::InvalidMessage(reason)) => {
                self.set_status(format!("Not sent: {reason}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Close the connection and quit.
    pub fn quit(&mut self) -> Vec<AppAction> {
        let session_actions = self.session.shutdown();
        let mut actions = self.apply_session(session_actions);
        actions.push(AppAction::Quit);
        actions
    }

    fn handle_enter(&mut self) -> Vec<AppAction> {
        let line = self.input.buffer().to_owned();
        if line.trim().is_empty() {
            return vec![];
        }

        let command = command::parse(&line);
        if !matches!(command, Command::Message { .. }) {
            self.input.clear();
        }

        match command {
            Command::Message { text } => self.send_message(&text),
            Command::Join { room } => self.join_room(&room),
            Command::Direct { user } => self.open_direct(&user),
            Command::Retry => self.retry(),
            Command::Rooms => {
                self.set_status("Refreshing rooms...");
                vec![AppAction::LoadRooms, AppAction::Render]
            },
            Command::Quit => self.quit(),
            Command::Unknown { input } => {
                self.set_status(format!("Unknown command: {input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                self.set_status(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Cycle to the next room in the room list, wrapping around.
    fn cycle_room(&mut self) -> Vec<AppAction> {
        if self.rooms.is_empty() {
            return vec![];
        }

        let current = self.rooms.iter().position(|r| &r.id == self.session.room_id());
        let next = current.map_or(0, |i| (i + 1) % self.rooms.len());
        let next_room = self.rooms[next].id.clone();
        self.join_room(next_room.as_str())
    }

    fn scroll_by(&mut self, rows: isize) -> Vec<AppAction> {
        let moved = self.viewport.scroll_by(rows, self.message_count());
        // Pushing up against the top re-reports so a failed backfill can be retried.
        if moved || (rows < 0 && self.viewport.scroll_top() == 0) {
            self.report_scroll()
        } else {
            vec![]
        }
    }

    /// Tell the session where the viewport is; may start a backfill.
    fn report_scroll(&mut self) -> Vec<AppAction> {
        let session_actions = self.session.handle(SessionEvent::Scrolled(self.metrics()));
        let mut actions = self.apply_session(session_actions);
        actions.push(AppAction::Render);
        actions
    }

    /// Translate session actions, applying view-only ones in place.
    ///
    /// Every scroll directive is followed by a position report, the same
    /// way a programmatic scroll raises a scroll event.
    fn apply_session(&mut self, actions: Vec<SessionAction>) -> Vec<AppAction> {
        let mut pending: VecDeque<SessionAction> = actions.into();
        let mut out = Vec::new();

        while let Some(action) = pending.pop_front() {
            match action {
                SessionAction::FetchHistory(request) => out.push(AppAction::FetchHistory(request)),
                SessionAction::Connection(action) => out.push(AppAction::Connection(action)),
                SessionAction::Scroll(directive) => {
                    self.viewport.apply(&directive, self.message_count());
                    pending.extend(self.session.handle(SessionEvent::Scrolled(self.metrics())));
                },
                SessionAction::StateChanged(state) => {
                    tracing::debug!(room = %self.session.room_id(), ?state, "connection state");
                },
                SessionAction::Notice(notice) => {
                    self.status_message = Some(notice_text(&notice));
                },
                SessionAction::ScheduleReconnect { id, delay, attempt } => {
                    self.status_message = Some(format!(
                        "Connection lost. Reconnecting in {}s (attempt {attempt})",
                        delay.as_secs_f32().ceil()
                    ));
                    out.push(AppAction::ScheduleReconnect { id, delay });
                },
            }
        }
        out
    }

    fn metrics(&self) -> ScrollMetrics {
        self.viewport.metrics(self.message_count())
    }

    fn message_count(&self) -> usize {
        self.session.messages().len()
    }

    /// Active room.
    pub fn room_id(&self) -> &RoomId {
        self.session.room_id()
    }

    /// Live connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.session.connection_state()
    }

    /// Messages of the active room, oldest first.
    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.session.messages()
    }

    /// Messages currently inside the viewport.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        let range = self.viewport.visible(self.message_count());
        self.session.messages().skip(range.start).take(range.len())
    }

    /// An older page is being fetched.
    pub fn is_loading_history(&self) -> bool {
        self.session.is_loading_history()
    }

    /// The active session.
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Rooms from the last room-list fetch.
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// Input line.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Scroll position.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Caller's user id, if known.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

/// Rows left for messages in a terminal `rows` tall.
pub fn chat_rows(rows: u16) -> usize {
    usize::from(rows.saturating_sub(CHAT_CHROME_ROWS))
}

/// Short label for a connection state.
pub fn state_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Disconnected => "Off",
        ConnectionState::Connecting => "Connecting",
        ConnectionState::Connected => "On",
        ConnectionState::ClosedForbidden => "Forbidden",
    }
}

fn notice_text(notice: &SessionNotice) -> String {
    match notice {
        SessionNotice::MembershipDenied => {
            "Not a member of this room. Join the room to chat.".to_owned()
        },
        SessionNotice::Unauthorized => "Credential rejected. Check your token.".to_owned(),
        SessionNotice::ConnectionLost => "Connection lost. /retry to reconnect.".to_owned(),
        SessionNotice::HistoryUnavailable(e) => format!("Could not load messages: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(RoomId::new("demo-room").unwrap(), SessionConfig::default(), Some("alice".into()))
    }

    #[test]
    fn start_seeds_connects_and_loads_rooms() {
        let mut app = app();
        let actions = app.start();

        assert!(matches!(actions.first(), Some(AppAction::FetchHistory(_))));
        assert!(actions.iter().any(|a| matches!(a, AppAction::Connection(_))));
        assert!(actions.contains(&AppAction::LoadRooms));
        assert_eq!(app.connection_state(), ConnectionState::Connecting);
    }

    #[test]
    fn send_while_connecting_keeps_input() {
        let mut app = app();
        let _ = app.start();
        "hello".chars().for_each(|c| {
            app.handle_key(KeyInput::Char(c));
        });

        let actions = app.handle_key(KeyInput::Enter);

        assert_eq!(actions, [AppAction::Render]);
        assert_eq!(app.input().buffer(), "hello");
        assert_eq!(app.status_message(), Some("Not sent: connection is Connecting"));
    }

    #[test]
    fn join_same_room_is_noop() {
        let mut app = app();
        let actions = app.join_room("demo-room");
        assert_eq!(actions, [AppAction::Render]);
    }

    #[test]
    fn dm_requires_user_id() {
        let mut app = App::new(RoomId::new("r").unwrap(), SessionConfig::default(), None);
        let actions = app.open_direct("bob");
        assert_eq!(actions, [AppAction::Render]);
        assert!(app.status_message().is_some_and(|s| s.contains("--user-id")));
    }

    #[test]
    fn dm_joins_sorted_pair_room() {
        let mut app = app();
        let _ = app.open_direct("bob");
        assert_eq!(app.room_id().as_str(), "alice_bob");
    }

    #[test]
    fn resize_updates_viewport() {
        let mut app = app();
        let _ = app.handle(AppEvent::Resize(100, 40));
        assert_eq!(app.viewport().height(), 34);
        assert_eq!(app.terminal_size(), (100, 40));
    }

    #[test]
    fn esc_quits_after_teardown() {
        let mut app = app();
        let _ = app.start();
        let actions = app.handle_key(KeyInput::Esc);

        assert!(matches!(actions.as_slice(), [AppAction::Connection(_), AppAction::Quit]));
    }

    #[test]
    fn up_at_top_retries_failed_backfill() {
        use turf_core::{MessageId, TransportError};

        fn fetch(actions: Vec<AppAction>) -> Option<turf_core::HistoryRequest> {
            actions.into_iter().find_map(|a| match a {
                AppAction::FetchHistory(request) => Some(request),
                _ => None,
            })
        }

        let config = SessionConfig { view: row_view_config(3, 50), ..SessionConfig::default() };
        let mut app = App::new(RoomId::new("r").unwrap(), config, None);
        let seed = fetch(app.start()).unwrap();
        let _ = app.handle(AppEvent::Resize(80, 10));
        let page = (0..3)
            .map(|n| Message {
                id: MessageId::new(n.to_string()),
                sender_id: "bob".into(),
                sender_handle: None,
                room_id: None,
                body: String::new(),
                attachment_url: None,
                attachment_type: None,
                created_at: String::new(),
            })
            .collect();

        // Three rows fit in four: the seed lands at the top and backfills.
        let first = fetch(app.handle(AppEvent::Session(SessionEvent::HistoryLoaded {
            request: seed.id,
            result: Ok(page),
        })))
        .unwrap();
        assert_eq!(first.offset, 3);
        assert_eq!(app.viewport().scroll_top(), 0);

        let _ = app.handle(AppEvent::Session(SessionEvent::HistoryLoaded {
            request: first.id,
            result: Err(TransportError::Unreachable("down".into())),
        }));

        let again = fetch(app.handle_key(KeyInput::Up)).unwrap();
        assert_eq!(again.offset, 3);
        assert_ne!(again.id, first.id);
        assert_eq!(app.viewport().scroll_top(), 0);
    }
}
