//! Application layer for Turf chat
//!
//! Pure state machine and generic runtime for chat frontends. The same
//! orchestration runs against a real terminal and against a scripted test
//! driver.
//!
//! # Components
//!
//! - [`App`]: UI state machine (input handling, room navigation, commands,
//!   viewport) wrapping the active [`turf_core::ChatSession`]
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod command;
mod driver;
mod event;
mod input;
mod runtime;
mod viewport;

pub use action::AppAction;
pub use app::{
    App, CHAT_CHROME_ROWS, NEAR_BOTTOM_ROWS, NEAR_TOP_ROWS, chat_rows, row_view_config, state_label,
};
pub use command::{Command, parse as parse_command};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{InputState, KeyInput};
pub use runtime::Runtime;
pub use viewport::Viewport;
