//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, time::Duration};

use turf_core::{ConnectionAction, HistoryRequest, ReconnectId};

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Network requests are fire-and-forget: the driver starts them and later
/// yields their completions from [`Driver::poll_event`] as
/// [`AppEvent::Session`] or [`AppEvent::RoomsLoaded`]. The runtime therefore
/// never awaits the network, only the next event.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, reqwest and tokio-tungstenite
///   for the network
/// - **Tests**: a scripted in-memory backend
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input event.
    ///
    /// Returns `None` if nothing arrived before the driver's poll interval.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Start fetching a history page.
    fn fetch_history(&mut self, request: HistoryRequest);

    /// Start fetching the room list.
    fn load_rooms(&mut self);

    /// Open, send on, close or discard a live connection.
    fn connection(&mut self, action: ConnectionAction);

    /// Deliver [`turf_core::SessionEvent::ReconnectDue`] for `id` after `delay`.
    fn schedule_reconnect(&mut self, id: ReconnectId, delay: Duration);

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop all network activity and clean up resources.
    ///
    /// Awaited once before [`crate::Runtime::run`] returns, so close
    /// handshakes queued by the final actions can still be flushed.
    fn stop(&mut self) -> impl Future<Output = ()> + Send;
}
