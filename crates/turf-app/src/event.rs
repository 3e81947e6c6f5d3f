//! Application input events.
//!
//! This module defines [`AppEvent`], the full set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two sources:
//! - User interactions (keyboard, resize) and periodic ticks.
//! - Network completions delivered by the driver (session events, the room
//!   list).

use turf_core::{SessionEvent, TransportError};
use turf_proto::RoomSummary;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Session input: history completion, socket event, scheduled reconnect.
    Session(SessionEvent),

    /// Room list fetched.
    RoomsLoaded(Result<Vec<RoomSummary>, TransportError>),

    /// Driver-level failure worth showing.
    Error {
        /// Error description.
        message: String,
    },
}
