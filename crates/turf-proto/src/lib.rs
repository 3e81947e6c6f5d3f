//! Turf chat wire protocol
//!
//! Types exchanged with the chat backend: history records and push frames
//! ([`Message`]), the inbound frame discriminator ([`InboundFrame`]), the
//! outbound send frame ([`OutboundFrame`]), close-code classification
//! ([`CloseReason`]) and room identifiers ([`RoomId`]).
//!
//! Everything here is plain data plus JSON codecs. No I/O.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod close;
pub mod errors;
pub mod frame;
pub mod message;
pub mod room;

pub use close::CloseReason;
pub use errors::{FrameError, RoomIdError};
pub use frame::{InboundFrame, MAX_BODY_CHARS, OutboundFrame};
pub use message::{Message, MessageId};
pub use room::{RoomId, RoomSummary};
