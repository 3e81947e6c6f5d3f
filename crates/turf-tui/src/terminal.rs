//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Network requests go through
//! [`Transport`], whose completions arrive on an unbounded channel.

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use turf_app::{App, AppEvent, Driver, KeyInput};
use turf_client::{Transport, TransportEvent};
use turf_core::{ConnectionAction, HistoryRequest, ReconnectId};

use crate::ui;

const TICK: Duration = Duration::from_millis(100);

/// How long quitting waits for the close handshake.
const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Every transport task and the transport itself are gone.
    #[error("transport channel closed")]
    TransportClosed,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui) and hands network
/// actions to the [`Transport`].
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    transport: Transport,
    network: UnboundedReceiver<TransportEvent>,
}

impl TerminalDriver {
    /// Enter raw mode and the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up.
    pub fn new(
        transport: Transport,
        network: UnboundedReceiver<TransportEvent>,
    ) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, transport, network })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::PageUp => Some(KeyInput::PageUp),
            KeyCode::PageDown => Some(KeyInput::PageDown),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn convert_network(event: TransportEvent) -> AppEvent {
        match event {
            TransportEvent::Session(event) => AppEvent::Session(event),
            TransportEvent::Rooms(result) => AppEvent::RoomsLoaded(result),
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key_event.code).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(None),
                }
            }

            // Network completions
            maybe_network = self.network.recv() => {
                maybe_network.map(Self::convert_network).map(Some).ok_or(TerminalError::TransportClosed)
            }

            () = tokio::time::sleep(TICK) => Ok(Some(AppEvent::Tick)),
        }
    }

    fn fetch_history(&mut self, request: HistoryRequest) {
        self.transport.fetch_history(request);
    }

    fn load_rooms(&mut self) {
        self.transport.load_rooms();
    }

    fn connection(&mut self, action: ConnectionAction) {
        self.transport.execute(action);
    }

    fn schedule_reconnect(&mut self, id: ReconnectId, delay: Duration) {
        self.transport.schedule_reconnect(id, delay);
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    async fn stop(&mut self) {
        self.transport.drain(CLOSE_GRACE).await;
        self.transport.shutdown();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.transport.shutdown();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
