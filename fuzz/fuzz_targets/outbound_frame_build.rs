//! Fuzz target for OutboundFrame::new
//!
//! # Invariants
//!
//! - An accepted frame's body is the trimmed input and never empty
//! - An accepted body is at most MAX_BODY_CHARS characters
//! - Encoding an accepted frame succeeds

#![no_main]

use libfuzzer_sys::fuzz_target;
use turf_proto::{MAX_BODY_CHARS, OutboundFrame};

fuzz_target!(|text: &str| {
    let Ok(frame) = OutboundFrame::new(text) else {
        return;
    };

    assert_eq!(frame.body(), text.trim());
    assert!(!frame.body().is_empty());
    assert!(frame.body().chars().count() <= MAX_BODY_CHARS);
    assert!(frame.encode().is_ok());
});
