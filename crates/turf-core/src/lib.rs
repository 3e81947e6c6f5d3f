//! Turf chat core
//!
//! Sans-IO state machines for a live chat room: paginated history, a push
//! message stream, and the merged view the user scrolls through.
//!
//! # Architecture
//!
//! Nothing in this crate performs I/O. Callers feed [`SessionEvent`]s into a
//! [`ChatSession`] and execute the [`SessionAction`]s it returns (fetch a
//! history page, open/close/send on the live connection, move the viewport).
//! Completions come back as further events. Because every handler runs to
//! completion on one event loop, the message buffer needs no locking.
//!
//! # Components
//!
//! - [`HistoryLoader`]: cursor, exhaustion and in-flight tracking for history
//!   pages
//! - [`LiveConnection`]: connection lifecycle and push frame classification
//! - [`ViewCoordinator`]: owns the [`MessageBuffer`] and the scroll policy
//! - [`ChatSession`]: one room's session composing the three
//! - [`ReconnectPolicy`]: opt-in supervised reconnect with backoff

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod buffer;
pub mod connection;
pub mod error;
pub mod history;
pub mod retry;
pub mod session;
pub mod view;

pub use buffer::{AppendOutcome, DEFAULT_CAPACITY, MessageBuffer};
pub use connection::{ConnectionAction, ConnectionId, ConnectionState, LiveConnection};
pub use error::{SessionError, TransportError};
pub use history::{
    DEFAULT_PAGE_SIZE, HistoryLoader, HistoryRequest, HistorySource, PageKind, RequestId,
};
pub use retry::ReconnectPolicy;
pub use session::{
    ChatSession, ReconnectId, SessionAction, SessionConfig, SessionEvent, SessionNotice,
};
pub use turf_proto::{CloseReason, Message, MessageId, RoomId};
pub use view::{ScrollAnchor, ScrollDirective, ScrollMetrics, ViewConfig, ViewCoordinator};
