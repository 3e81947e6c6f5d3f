//! Live WebSocket connection task.
//!
//! Each [`ConnectionAction::Open`](turf_core::ConnectionAction::Open) spawns
//! one task that owns the socket. The task reports everything it observes
//! as [`SessionEvent`]s tagged with the connection id and takes commands
//! through a [`LiveSocket`] handle. It never retries on its own.

use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message as WsMessage},
};
use tracing::{debug, info, warn};
use turf_core::{ConnectionId, SessionEvent};
use turf_proto::close;

use crate::TransportEvent;

enum SocketCommand {
    Send(String),
    Close,
}

/// Handle to a running socket task.
#[derive(Debug)]
pub struct LiveSocket {
    id: ConnectionId,
    commands: mpsc::UnboundedSender<SocketCommand>,
    task: JoinHandle<()>,
}

impl LiveSocket {
    /// Connect to `url` in a new task.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(
        id: ConnectionId,
        url: String,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(id, url, rx, events));
        Self { id, commands, task }
    }

    /// Queue a text frame. Dropped if the task has ended.
    pub fn send(&self, text: String) {
        if self.commands.send(SocketCommand::Send(text)).is_err() {
            debug!(connection = self.id.get(), "send on finished socket");
        }
    }

    /// Start a normal close handshake.
    ///
    /// The returned task ends once the close frame is written.
    pub fn close(self) -> JoinHandle<()> {
        let _ = self.commands.send(SocketCommand::Close);
        self.task
    }

    /// Drop the socket without a close handshake.
    pub fn discard(self) {
        self.task.abort();
    }

    /// Whether the task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Connection id this socket reports under.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

async fn run(
    id: ConnectionId,
    url: String,
    mut commands: mpsc::UnboundedReceiver<SocketCommand>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let report = |event: SessionEvent| {
        let _ = events.send(TransportEvent::Session(event));
    };

    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(tungstenite::Error::Http(response)) => {
            let status = response.status().as_u16();
            warn!(connection = id.get(), status, "live connection handshake rejected");
            report(rejection_event(id, status));
            return;
        },
        Err(e) => {
            warn!(connection = id.get(), error = %e, "live connection failed to open");
            report(SessionEvent::ConnectionFailed { connection: id, detail: e.to_string() });
            return;
        },
    };

    info!(connection = id.get(), "live connection established");
    report(SessionEvent::ConnectionOpened { connection: id });

    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SocketCommand::Send(text)) => {
                    if let Err(e) = write.send(WsMessage::Text(text.into())).await {
                        report(SessionEvent::ConnectionFailed { connection: id, detail: e.to_string() });
                        return;
                    }
                },
                Some(SocketCommand::Close) | None => {
                    debug!(connection = id.get(), "closing live connection");
                    let _ = write.send(WsMessage::Close(None)).await;
                    return;
                },
            },

            frame = read.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    report(SessionEvent::FrameReceived { connection: id, text: text.to_string() });
                },
                Some(Ok(WsMessage::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code));
                    report(SessionEvent::ConnectionClosed { connection: id, code });
                    return;
                },
                // Pings are answered by tungstenite; binary frames carry nothing for chat.
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    report(SessionEvent::ConnectionFailed { connection: id, detail: e.to_string() });
                    return;
                },
                None => {
                    report(SessionEvent::ConnectionClosed { connection: id, code: None });
                    return;
                },
            },
        }
    }
}

/// Map an HTTP handshake rejection to the close code a server would send
/// after accepting.
fn rejection_event(id: ConnectionId, status: u16) -> SessionEvent {
    match status {
        403 => SessionEvent::ConnectionClosed {
            connection: id,
            code: Some(close::MEMBERSHIP_DENIED),
        },
        401 => SessionEvent::ConnectionClosed { connection: id, code: Some(close::UNAUTHORIZED) },
        other => SessionEvent::ConnectionFailed {
            connection: id,
            detail: format!("handshake rejected with status {other}"),
        },
    }
}
