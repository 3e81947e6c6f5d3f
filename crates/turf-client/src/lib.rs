//! Network adapters for the Turf chat session
//!
//! Executes what [`turf_core::ChatSession`] asks for: history pages and the
//! room list over HTTP (`reqwest`), the live stream over WebSocket
//! (`tokio-tungstenite`).
//!
//! # Components
//!
//! - [`ClientConfig`]: API and WebSocket bases plus the bearer token
//! - [`HttpApi`]: [`turf_core::HistorySource`] over `GET /messages`, and
//!   `GET /chatrooms`
//! - [`LiveSocket`]: one WebSocket connection task
//! - [`Transport`]: runs all of the above on tokio tasks and reports
//!   completions as [`TransportEvent`]s

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod http;
mod socket;
mod transport;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpApi;
pub use socket::LiveSocket;
pub use transport::{Transport, TransportEvent};
