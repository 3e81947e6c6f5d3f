//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use std::time::Duration;

use turf_core::{ConnectionAction, HistoryRequest, ReconnectId};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Fetch a history page.
    FetchHistory(HistoryRequest),

    /// Open, send on, close or discard the live connection.
    Connection(ConnectionAction),

    /// Deliver a reconnect event after a delay.
    ScheduleReconnect {
        /// Timer identity the reconnect event must carry.
        id: ReconnectId,
        /// Wait before the reconnect fires.
        delay: Duration,
    },

    /// Fetch the room list.
    LoadRooms,
}
