//! Fuzz target for InboundFrame::decode
//!
//! Live frames come straight off the socket. Decoding must never panic;
//! anything that is not a well-formed frame returns an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use turf_proto::InboundFrame;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(InboundFrame::Message(message)) = InboundFrame::decode(text) {
        // Derived display fields must not panic on arbitrary content.
        let _ = message.display_name();
        let _ = message.avatar_initial();
        let _ = message.time_label();
    }
});
