//! Client setup errors.
//!
//! Runtime I/O failures never surface here: they are reported to the session
//! as events ([`turf_core::SessionEvent::ConnectionFailed`],
//! [`turf_core::TransportError`]).

use thiserror::Error;

/// Errors building the client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Base URL could not be parsed or has an unsupported scheme.
    #[error("invalid {which} base url {url:?}: {reason}")]
    InvalidBaseUrl {
        /// `"api"` or `"ws"`
        which: &'static str,
        /// The rejected value
        url: String,
        /// What is wrong with it
        reason: String,
    },

    /// HTTP client could not be constructed.
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}
