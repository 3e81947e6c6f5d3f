//! In-memory chat backend shared by the App tests.
//!
//! Answers every driver request immediately with the events a real server
//! would eventually produce, so tests are deterministic.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    convert::Infallible,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use turf_app::{App, AppAction, AppEvent, Driver, KeyInput};
use turf_core::{
    ConnectionAction, ConnectionId, HistoryRequest, Message, MessageId, ReconnectId, SessionEvent,
};
use turf_proto::{RoomId, RoomSummary, close};

pub fn msg(room: &str, n: usize) -> Message {
    Message {
        id: MessageId::new(format!("{room}-{n}")),
        sender_id: "carol".into(),
        sender_handle: Some("carol".into()),
        room_id: Some(room.into()),
        body: format!("message {n}"),
        attachment_url: None,
        attachment_type: None,
        created_at: "2024-05-01T09:30:00".into(),
    }
}

/// Server-side state: per-room history (oldest first) and membership.
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub history: HashMap<RoomId, Vec<Message>>,
    pub forbidden: HashSet<RoomId>,
    pub rooms: Vec<RoomSummary>,
    pub open: HashMap<ConnectionId, RoomId>,
    pub sent: Vec<String>,
    pub closed: Vec<ConnectionId>,
    pub discarded: Vec<ConnectionId>,
    pub fetches: Vec<HistoryRequest>,
    pub reconnects: Vec<Duration>,
    next_echo: usize,
}

impl FakeBackend {
    pub fn with_room(mut self, room: &str, count: usize) -> Self {
        let id = RoomId::new(room).unwrap();
        self.history.insert(id.clone(), (0..count).map(|n| msg(room, n)).collect());
        self.rooms.push(RoomSummary { id, name: room.into(), is_group: true });
        self
    }

    pub fn forbid(mut self, room: &str) -> Self {
        self.forbidden.insert(RoomId::new(room).unwrap());
        self
    }

    /// Page `limit` messages older than `offset` counted from the newest.
    fn page(&self, request: &HistoryRequest) -> Vec<Message> {
        let all = self.history.get(&request.room_id).map_or(&[][..], Vec::as_slice);
        let end = all.len().saturating_sub(request.offset);
        let start = end.saturating_sub(request.limit);
        all[start..end].to_vec()
    }

    pub fn fetch_history(&mut self, request: HistoryRequest) -> AppEvent {
        let page = self.page(&request);
        self.fetches.push(request.clone());
        AppEvent::Session(SessionEvent::HistoryLoaded { request: request.id, result: Ok(page) })
    }

    pub fn load_rooms(&self) -> AppEvent {
        AppEvent::RoomsLoaded(Ok(self.rooms.clone()))
    }

    pub fn connection(&mut self, action: ConnectionAction) -> Vec<AppEvent> {
        match action {
            ConnectionAction::Open { id, room_id } => {
                if self.forbidden.contains(&room_id) {
                    return vec![AppEvent::Session(SessionEvent::ConnectionClosed {
                        connection: id,
                        code: Some(close::MEMBERSHIP_DENIED),
                    })];
                }
                self.open.insert(id, room_id);
                vec![AppEvent::Session(SessionEvent::ConnectionOpened { connection: id })]
            },
            ConnectionAction::Send { id, frame } => {
                self.sent.push(frame.body().to_owned());
                let Some(room) = self.open.get(&id).cloned() else {
                    return vec![];
                };
                // Broadcast back to the sender like the real server.
                self.next_echo += 1;
                let echo = serde_json::json!({
                    "type": "message",
                    "id": format!("echo-{}", self.next_echo),
                    "room_id": room.as_str(),
                    "sender_id": "alice",
                    "body": frame.body(),
                    "created_at": "2024-05-01T10:00:00",
                });
                vec![AppEvent::Session(SessionEvent::FrameReceived {
                    connection: id,
                    text: echo.to_string(),
                })]
            },
            ConnectionAction::Close { id } => {
                self.open.remove(&id);
                self.closed.push(id);
                vec![]
            },
            ConnectionAction::Discard { id } => {
                self.open.remove(&id);
                self.discarded.push(id);
                vec![]
            },
        }
    }

    /// Push a live message to every socket open on `room`.
    pub fn push(&self, room: &str, message: &Message) -> Vec<AppEvent> {
        let text = serde_json::json!({
            "type": "message",
            "id": message.id.as_str(),
            "room_id": room,
            "sender_id": message.sender_id,
            "body": message.body,
            "created_at": message.created_at,
        })
        .to_string();
        self.open
            .iter()
            .filter(|(_, r)| r.as_str() == room)
            .map(|(id, _)| {
                AppEvent::Session(SessionEvent::FrameReceived { connection: *id, text: text.clone() })
            })
            .collect()
    }

    /// Execute `actions`, feeding resulting events back into `app` until
    /// nothing is pending. Returns `true` if the app quit.
    pub fn settle(&mut self, app: &mut App, actions: Vec<AppAction>) -> bool {
        let mut pending: VecDeque<AppEvent> = VecDeque::new();
        let mut quit = self.execute(actions, &mut pending);
        while let Some(event) = pending.pop_front() {
            let actions = app.handle(event);
            quit |= self.execute(actions, &mut pending);
        }
        quit
    }

    fn execute(&mut self, actions: Vec<AppAction>, pending: &mut VecDeque<AppEvent>) -> bool {
        let mut quit = false;
        for action in actions {
            match action {
                AppAction::Render => {},
                AppAction::Quit => quit = true,
                AppAction::FetchHistory(request) => pending.push_back(self.fetch_history(request)),
                AppAction::Connection(action) => pending.extend(self.connection(action)),
                AppAction::ScheduleReconnect { id, delay } => {
                    self.reconnects.push(delay);
                    pending.push_back(AppEvent::Session(SessionEvent::ReconnectDue(id)));
                },
                AppAction::LoadRooms => pending.push_back(self.load_rooms()),
            }
        }
        quit
    }
}

/// Driver over a shared [`FakeBackend`] that replays a scripted list of
/// user events once the network is quiet, then presses Esc.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    pub backend: Arc<Mutex<FakeBackend>>,
    pub script: VecDeque<AppEvent>,
    pub network: VecDeque<AppEvent>,
    pub renders: Arc<Mutex<usize>>,
}

impl ScriptedDriver {
    pub fn new(backend: FakeBackend) -> Self {
        Self { backend: Arc::new(Mutex::new(backend)), ..Self::default() }
    }

    pub fn keys(mut self, text: &str) -> Self {
        self.script.extend(text.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
        self
    }

    pub fn key(mut self, key: KeyInput) -> Self {
        self.script.push_back(AppEvent::Key(key));
        self
    }

    pub fn keys_n(mut self, key: KeyInput, n: usize) -> Self {
        self.script.extend(std::iter::repeat_n(AppEvent::Key(key), n));
        self
    }

    pub fn line(self, text: &str) -> Self {
        self.keys(text).key(KeyInput::Enter)
    }

    pub fn event(mut self, event: AppEvent) -> Self {
        self.script.push_back(event);
        self
    }

    fn backend(&self) -> MutexGuard<'_, FakeBackend> {
        self.backend.lock().unwrap()
    }
}

impl Driver for ScriptedDriver {
    type Error = Infallible;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let event = self
            .network
            .pop_front()
            .or_else(|| self.script.pop_front())
            .unwrap_or(AppEvent::Key(KeyInput::Esc));
        Ok(Some(event))
    }

    fn fetch_history(&mut self, request: HistoryRequest) {
        let event = self.backend().fetch_history(request);
        self.network.push_back(event);
    }

    fn load_rooms(&mut self) {
        let event = self.backend().load_rooms();
        self.network.push_back(event);
    }

    fn connection(&mut self, action: ConnectionAction) {
        let events = self.backend().connection(action);
        self.network.extend(events);
    }

    fn schedule_reconnect(&mut self, id: ReconnectId, delay: Duration) {
        self.backend().reconnects.push(delay);
        self.network.push_back(AppEvent::Session(SessionEvent::ReconnectDue(id)));
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        *self.renders.lock().unwrap() += 1;
        Ok(())
    }

    async fn stop(&mut self) {
        self.network.clear();
    }
}
