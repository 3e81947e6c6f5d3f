//! Executes session I/O on tokio tasks.
//!
//! [`Transport`] is the bridge between the Sans-IO [`turf_core::ChatSession`]
//! and the network. Every request runs on its own task and reports back
//! through one unbounded channel of [`TransportEvent`]s, so the caller's
//! event loop stays the only place state is mutated.

use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::future::join_all;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};
use turf_core::{
    ConnectionAction, ConnectionId, HistoryRequest, HistorySource, ReconnectId, SessionEvent,
    TransportError,
};
use turf_proto::RoomSummary;

use crate::{ClientConfig, ClientError, HttpApi, LiveSocket};

/// Completion reported by a transport task.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Feed to the session.
    Session(SessionEvent),
    /// Result of [`Transport::load_rooms`].
    Rooms(Result<Vec<RoomSummary>, TransportError>),
}

/// Network side of a chat session.
#[derive(Debug)]
pub struct Transport {
    config: Arc<ClientConfig>,
    api: HttpApi,
    events: mpsc::UnboundedSender<TransportEvent>,
    sockets: HashMap<ConnectionId, LiveSocket>,
    closing: Vec<JoinHandle<()>>,
}

impl Transport {
    /// Create a transport and the receiver its events arrive on.
    pub fn new(
        config: ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TransportEvent>), ClientError> {
        let config = Arc::new(config);
        let api = HttpApi::new(Arc::clone(&config))?;
        let (events, rx) = mpsc::unbounded_channel();
        Ok((Self { config, api, events, sockets: HashMap::new(), closing: Vec::new() }, rx))
    }

    /// Fetch a history page; completes with
    /// [`SessionEvent::HistoryLoaded`].
    pub fn fetch_history(&self, request: HistoryRequest) {
        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.load_page(&request.room_id, request.offset, request.limit).await;
            let _ = events.send(TransportEvent::Session(SessionEvent::HistoryLoaded {
                request: request.id,
                result,
            }));
        });
    }

    /// Fetch the room list; completes with [`TransportEvent::Rooms`].
    pub fn load_rooms(&self) {
        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.list_rooms().await;
            let _ = events.send(TransportEvent::Rooms(result));
        });
    }

    /// Emit [`SessionEvent::ReconnectDue`] for `id` after `delay`.
    pub fn schedule_reconnect(&self, id: ReconnectId, delay: Duration) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(TransportEvent::Session(SessionEvent::ReconnectDue(id)));
        });
    }

    /// Perform a connection action.
    pub fn execute(&mut self, action: ConnectionAction) {
        match action {
            ConnectionAction::Open { id, room_id } => {
                self.sockets.retain(|_, socket| !socket.is_finished());
                self.closing.retain(|task| !task.is_finished());
                match self.config.live_url(&room_id) {
                    Ok(url) => {
                        let socket = LiveSocket::spawn(id, url.into(), self.events.clone());
                        self.sockets.insert(id, socket);
                    },
                    Err(e) => {
                        let _ = self.events.send(TransportEvent::Session(
                            SessionEvent::ConnectionFailed { connection: id, detail: e.to_string() },
                        ));
                    },
                }
            },
            ConnectionAction::Send { id, frame } => match (self.sockets.get(&id), frame.encode()) {
                (Some(socket), Ok(text)) => socket.send(text),
                (None, _) => debug!(connection = id.get(), "send to unknown socket"),
                (_, Err(e)) => warn!(connection = id.get(), error = %e, "unencodable frame"),
            },
            ConnectionAction::Close { id } => {
                if let Some(socket) = self.sockets.remove(&id) {
                    self.closing.push(socket.close());
                }
            },
            ConnectionAction::Discard { id } => {
                if let Some(socket) = self.sockets.remove(&id) {
                    socket.discard();
                }
            },
        }
    }

    /// Wait up to `grace` for close handshakes started by
    /// [`ConnectionAction::Close`], then abort whatever is left.
    pub async fn drain(&mut self, grace: Duration) {
        let closing = std::mem::take(&mut self.closing);
        if closing.is_empty() {
            return;
        }
        let aborts: Vec<_> = closing.iter().map(JoinHandle::abort_handle).collect();
        if tokio::time::timeout(grace, join_all(closing)).await.is_err() {
            warn!(pending = aborts.len(), "close handshakes did not finish in time");
            for task in aborts {
                task.abort();
            }
        }
    }

    /// Drop every socket without waiting.
    pub fn shutdown(&mut self) {
        for (_, socket) in self.sockets.drain() {
            socket.discard();
        }
        for task in self.closing.drain(..) {
            task.abort();
        }
    }

    /// HTTP endpoints.
    pub fn api(&self) -> &HttpApi {
        &self.api
    }
}
