// Serde shape tests for the JSON control plane.

use media_ingest::protocol::{ControlMessage, OutboundMessage};
use serde_json::json;

#[test]
fn test_audio_metadata_parses() {
    let msg: ControlMessage = serde_json::from_value(json!({
        "type": "audio_metadata",
        "session_id": "s1",
        "chunk_index": 3,
        "start_timestamp": "2026-08-30T10:00:00Z",
        "end_timestamp": "2026-08-30T10:00:10Z",
        "duration_ms": 9990,
        "size_bytes": 160652,
    }))
    .unwrap();

    match msg {
        ControlMessage::AudioMetadata {
            session_id,
            chunk_index,
            duration_ms,
            size_bytes,
            ..
        } => {
            assert_eq!(session_id, "s1");
            assert_eq!(chunk_index, 3);
            assert_eq!(duration_ms, Some(9990));
            assert_eq!(size_bytes, Some(160652));
        }
        other => panic!("Parsed as {:?}", other),
    }
}

#[test]
fn test_optional_metadata_fields_may_be_absent() {
    let msg: ControlMessage = serde_json::from_value(json!({
        "type": "frame_metadata",
        "session_id": "s1",
        "frame_index": 0,
    }))
    .unwrap();

    match msg {
        ControlMessage::FrameMetadata {
            chunk_index,
            offset_ms,
            ..
        } => {
            assert_eq!(chunk_index, None);
            assert_eq!(offset_ms, None);
        }
        other => panic!("Parsed as {:?}", other),
    }
}

#[test]
fn test_index_beyond_u32_is_rejected_not_wrapped() {
    let result: Result<ControlMessage, _> = serde_json::from_value(json!({
        "type": "audio_metadata",
        "session_id": "s1",
        "chunk_index": 4_294_967_296u64,
    }));

    assert!(result.is_err(), "An index past u32::MAX must fail parsing");
}

#[test]
fn test_ack_wire_shapes() {
    assert_eq!(
        serde_json::to_value(OutboundMessage::AudioAck { index: 0 }).unwrap(),
        json!({ "type": "audio_ack", "index": 0 })
    );
    assert_eq!(
        serde_json::to_value(OutboundMessage::FrameAck { index: 12 }).unwrap(),
        json!({ "type": "frame_ack", "index": 12 })
    );
    assert_eq!(
        serde_json::to_value(OutboundMessage::SessionInitAck {
            session_id: "s1".to_string(),
            status: "ready".to_string(),
        })
        .unwrap(),
        json!({ "type": "session_init_ack", "session_id": "s1", "status": "ready" })
    );
    assert_eq!(
        serde_json::to_value(OutboundMessage::CompleteAck).unwrap(),
        json!({ "type": "complete_ack" })
    );
    assert_eq!(
        serde_json::to_value(OutboundMessage::Pong).unwrap(),
        json!({ "type": "pong" })
    );
}
