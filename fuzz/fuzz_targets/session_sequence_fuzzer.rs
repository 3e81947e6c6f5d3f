//! Fuzz target for ChatSession under arbitrary event orderings
//!
//! # Strategy
//!
//! - History completions are delivered late, twice, or for the wrong request
//! - Live frames arrive on current and stale connections, with repeated ids
//! - Scroll reports, room switches, closes and retries interleave freely
//! - Reconnect timers fire late, including ones a switch or retry superseded
//!
//! # Invariants
//!
//! - Buffered message ids are unique
//! - At most one history request is in flight
//! - A backfill is never requested once history is exhausted
//! - Sends are only accepted while connected
//! - Only the most recently scheduled reconnect timer restarts the room

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use turf_core::{
    ChatSession, ConnectionAction, ConnectionId, ConnectionState, HistoryRequest, Message,
    MessageId, PageKind, ReconnectId, RoomId, ScrollMetrics, SessionAction, SessionConfig, SessionEvent,
    ViewConfig,
};

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    page_size: u8,
    capacity: u8,
    ops: Vec<Op>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    /// Complete the oldest pending fetch with `len` messages.
    CompleteFetch { len: u8, fail: bool },
    /// Replay an already completed fetch.
    ReplayFetch { len: u8 },
    /// Open the newest socket.
    Opened,
    /// Push message `id` on the newest or a stale socket.
    Push { id: u16, stale: bool },
    /// Push an unrelated frame.
    Garbage { text: String },
    Scroll { top: u16, height: u8 },
    Closed { code: Option<u16> },
    Failed,
    Switch { room: u8 },
    Retry,
    /// Fire the newest or the oldest reconnect timer.
    ReconnectDue { stale: bool },
    Send { text: String },
}

struct Harness {
    session: ChatSession,
    pending: Vec<HistoryRequest>,
    completed: Vec<HistoryRequest>,
    sockets: Vec<ConnectionId>,
    timers: Vec<ReconnectId>,
    exhausted_room: Option<RoomId>,
}

impl Harness {
    fn apply(&mut self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::FetchHistory(request) => {
                    assert!(
                        self.pending.iter().all(|p| p.room_id != request.room_id)
                            || request.kind == PageKind::Seed,
                        "overlapping history requests"
                    );
                    if request.kind == PageKind::Backfill {
                        assert_ne!(
                            self.exhausted_room.as_ref(),
                            Some(&request.room_id),
                            "backfill after exhaustion"
                        );
                    }
                    self.pending.push(request);
                },
                SessionAction::Connection(ConnectionAction::Open { id, .. }) => {
                    self.sockets.push(id);
                },
                SessionAction::ScheduleReconnect { id, .. } => {
                    assert!(self.timers.last().is_none_or(|last| *last < id), "timer id reused");
                    self.timers.push(id);
                },
                _ => {},
            }
        }
    }

    fn check(&self) {
        let ids: HashSet<&str> = self.session.messages().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), self.session.messages().len(), "duplicate ids");
    }
}

fn message(prefix: &str, n: usize) -> Message {
    Message {
        id: MessageId::new(format!("{prefix}-{n}")),
        sender_id: "fuzz".into(),
        sender_handle: None,
        room_id: None,
        body: String::new(),
        attachment_url: None,
        attachment_type: None,
        created_at: String::new(),
    }
}

fn page(request: &HistoryRequest, len: usize) -> Vec<Message> {
    let len = len.min(request.limit);
    // Newest first offset: ids descend as the offset grows.
    let top = 10_000usize.saturating_sub(request.offset);
    (0..len).rev().map(|i| message(request.room_id.as_str(), top.saturating_sub(i + 1))).collect()
}

fuzz_target!(|scenario: Scenario| {
    let config = SessionConfig {
        view: ViewConfig {
            page_size: usize::from(scenario.page_size.max(1)),
            capacity: usize::from(scenario.capacity.max(1)),
            ..ViewConfig::default()
        },
        jitter_seed: Some(7),
        ..SessionConfig::default()
    };
    let Ok(room) = RoomId::new("fuzz-room") else {
        return;
    };

    let mut h = Harness {
        session: ChatSession::new(room, config),
        pending: Vec::new(),
        completed: Vec::new(),
        sockets: Vec::new(),
        timers: Vec::new(),
        exhausted_room: None,
    };
    let actions = h.session.start();
    h.apply(actions);

    for op in scenario.ops {
        let actions = match op {
            Op::CompleteFetch { len, fail } => {
                if h.pending.is_empty() {
                    continue;
                }
                let request = h.pending.remove(0);
                let result = if fail {
                    Err(turf_core::TransportError::Unreachable("fuzz".into()))
                } else {
                    Ok(page(&request, usize::from(len)))
                };
                let actions = h.session.handle(SessionEvent::HistoryLoaded {
                    request: request.id,
                    result,
                });
                if h.session.view().loader().is_exhausted() {
                    h.exhausted_room = Some(h.session.room_id().clone());
                }
                h.completed.push(request);
                actions
            },
            Op::ReplayFetch { len } => {
                let Some(request) = h.completed.last().cloned() else {
                    continue;
                };
                h.session.handle(SessionEvent::HistoryLoaded {
                    request: request.id,
                    result: Ok(page(&request, usize::from(len))),
                })
            },
            Op::Opened => {
                let Some(&id) = h.sockets.last() else {
                    continue;
                };
                h.session.handle(SessionEvent::ConnectionOpened { connection: id })
            },
            Op::Push { id, stale } => {
                let socket = if stale { h.sockets.first() } else { h.sockets.last() };
                let Some(&connection) = socket else {
                    continue;
                };
                let text = format!(
                    r#"{{"type":"message","id":"live-{id}","sender_id":"u","body":"b","created_at":"t"}}"#
                );
                h.session.handle(SessionEvent::FrameReceived { connection, text })
            },
            Op::Garbage { text } => {
                let Some(&connection) = h.sockets.last() else {
                    continue;
                };
                h.session.handle(SessionEvent::FrameReceived { connection, text })
            },
            Op::Scroll { top, height } => h.session.handle(SessionEvent::Scrolled(ScrollMetrics {
                scroll_top: u32::from(top),
                scroll_height: u32::try_from(h.session.messages().len()).unwrap_or(u32::MAX),
                client_height: u32::from(height),
            })),
            Op::Closed { code } => {
                let Some(&connection) = h.sockets.last() else {
                    continue;
                };
                h.session.handle(SessionEvent::ConnectionClosed { connection, code })
            },
            Op::Failed => {
                let Some(&connection) = h.sockets.last() else {
                    continue;
                };
                h.session.handle(SessionEvent::ConnectionFailed {
                    connection,
                    detail: "fuzz".into(),
                })
            },
            Op::Switch { room } => {
                let Ok(room_id) = RoomId::new(format!("room-{}", room % 4)) else {
                    continue;
                };
                h.pending.clear();
                h.exhausted_room = None;
                h.session.switch_room(room_id)
            },
            Op::Retry => {
                h.pending.clear();
                h.exhausted_room = None;
                h.session.retry()
            },
            Op::ReconnectDue { stale } => {
                let timer = if stale { h.timers.first() } else { h.timers.last() };
                let Some(&timer) = timer else {
                    continue;
                };
                let current = h.session.is_reconnect_pending() && h.timers.last() == Some(&timer);
                let actions = h.session.handle(SessionEvent::ReconnectDue(timer));
                if current {
                    h.pending.clear();
                    h.exhausted_room = None;
                } else {
                    assert!(actions.is_empty(), "superseded reconnect timer restarted the room");
                }
                actions
            },
            Op::Send { text } => {
                let connected = h.session.connection_state() == ConnectionState::Connected;
                match h.session.send(&text) {
                    Ok(actions) => {
                        assert!(connected, "send accepted while not connected");
                        actions
                    },
                    Err(_) => continue,
                }
            },
        };
        h.apply(actions);
        h.check();
    }
});
