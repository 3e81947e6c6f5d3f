//! Terminal UI for Turf chat
//!
//! A thin shell over [`turf_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`turf_app::Runtime`].
//!
//! This crate only handles terminal rendering and wiring the network
//! transport to the runtime.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use terminal::{TerminalDriver, TerminalError};
pub use turf_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
