//! Property-based tests for live frame decoding.
//!
//! Decoding runs on every pushed frame, so it must never panic and must
//! classify frames by discriminator alone.

use proptest::prelude::*;
use turf_proto::{InboundFrame, Message, MessageId, OutboundFrame};

/// Strategy for message records as the server pushes them.
fn arbitrary_message() -> impl Strategy<Value = Message> {
    (
        "[a-z0-9-]{1,36}",
        "[a-z0-9-]{1,36}",
        proptest::option::of("[a-z]{1,12}"),
        ".{0,200}",
        proptest::option::of("https://[a-z]{1,10}\\.example/[a-z]{1,8}"),
    )
        .prop_map(|(id, sender_id, sender_handle, body, attachment_url)| Message {
            id: MessageId::new(id),
            sender_id,
            sender_handle,
            room_id: Some("room".into()),
            body,
            attachment_type: attachment_url.as_ref().map(|_| "image/png".to_owned()),
            attachment_url,
            created_at: "2024-05-01T10:00:00".into(),
        })
}

proptest! {
    #[test]
    fn prop_decode_never_panics(text in ".{0,512}") {
        let _ = InboundFrame::decode(&text);
    }

    #[test]
    fn prop_message_frames_decode_to_record(message in arbitrary_message()) {
        let mut value = serde_json::to_value(&message).unwrap();
        value["type"] = serde_json::Value::from("message");
        let text = serde_json::to_string(&value).unwrap();

        prop_assert_eq!(InboundFrame::decode(&text).unwrap(), InboundFrame::Message(message));
    }

    #[test]
    fn prop_unknown_kinds_are_not_messages(kind in "[a-z_]{1,16}") {
        prop_assume!(kind != "message");
        let text = format!(r#"{{"type":"{kind}","id":"1","sender_id":"u","body":"b","created_at":"t"}}"#);

        prop_assert_eq!(InboundFrame::decode(&text).unwrap(), InboundFrame::Other { kind });
    }

    #[test]
    fn prop_outbound_body_is_trimmed(core in "[a-z]{1,50}", pad in "[ \t\n]{0,5}") {
        let frame = OutboundFrame::new(&format!("{pad}{core}{pad}")).unwrap();
        prop_assert_eq!(frame.body(), core.as_str());
    }
}

#[test]
fn outbound_encoding_contains_only_body() {
    let frame = OutboundFrame::new("  on my way  ").unwrap();
    insta::assert_snapshot!(frame.encode().unwrap(), @r#"{"body":"on my way"}"#);
}
