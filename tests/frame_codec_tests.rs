// Unit tests for the binary wire codec.
//
// Layout under test: bytes 0-35 session id (space-padded text), byte 36
// stream tag ('a'/'f'), bytes 37-40 big-endian u32 index, bytes 41+ payload.

use media_ingest::error::IngestError;
use media_ingest::protocol::{Frame, StreamKind, HEADER_LEN, SESSION_ID_LEN};

#[test]
fn test_roundtrip_audio_frame() {
    let frame = Frame {
        session_id: "0b0723f1-2e95-42b1-9f90-6a4c1ea3ab00".to_string(),
        stream: StreamKind::Audio,
        index: 7,
        payload: vec![1, 2, 3, 4, 5],
    };

    let bytes = frame.encode().unwrap();
    let decoded = Frame::decode(&bytes).unwrap();

    assert_eq!(decoded, frame);
}

#[test]
fn test_roundtrip_video_frame_with_empty_payload() {
    let frame = Frame {
        session_id: "s1".to_string(),
        stream: StreamKind::Video,
        index: u32::MAX,
        payload: vec![],
    };

    let bytes = frame.encode().unwrap();
    assert_eq!(bytes.len(), HEADER_LEN, "Empty payload means header only");

    let decoded = Frame::decode(&bytes).unwrap();
    assert_eq!(decoded.session_id, "s1");
    assert_eq!(decoded.stream, StreamKind::Video);
    assert_eq!(decoded.index, u32::MAX);
    assert!(decoded.payload.is_empty());
}

#[test]
fn test_header_layout_is_exact() {
    let frame = Frame {
        session_id: "abc".to_string(),
        stream: StreamKind::Audio,
        index: 0x01020304,
        payload: vec![0xff],
    };

    let bytes = frame.encode().unwrap();

    // Session id occupies the fixed field, padded with spaces.
    assert_eq!(&bytes[..3], b"abc");
    assert!(bytes[3..SESSION_ID_LEN].iter().all(|&b| b == b' '));
    // Stream tag.
    assert_eq!(bytes[SESSION_ID_LEN], b'a');
    // Big-endian index.
    assert_eq!(&bytes[SESSION_ID_LEN + 1..HEADER_LEN], &[1, 2, 3, 4]);
    // Payload follows immediately.
    assert_eq!(&bytes[HEADER_LEN..], &[0xff]);
}

#[test]
fn test_short_message_is_malformed() {
    // Anything under the 41-byte header is rejected outright.
    let err = Frame::decode(&[0u8; 10]).unwrap_err();
    assert!(matches!(err, IngestError::MalformedFrame(_)));

    let err = Frame::decode(&[b' '; HEADER_LEN - 1]).unwrap_err();
    assert!(matches!(err, IngestError::MalformedFrame(_)));
}

#[test]
fn test_unknown_stream_tag_is_malformed() {
    let mut bytes = Frame {
        session_id: "s1".to_string(),
        stream: StreamKind::Audio,
        index: 0,
        payload: vec![],
    }
    .encode()
    .unwrap();

    bytes[SESSION_ID_LEN] = b'x';

    let err = Frame::decode(&bytes).unwrap_err();
    assert!(matches!(err, IngestError::MalformedFrame(_)));
}

#[test]
fn test_non_utf8_session_field_is_malformed() {
    let mut bytes = vec![0xf0u8; HEADER_LEN];
    bytes[SESSION_ID_LEN] = b'a';

    let err = Frame::decode(&bytes).unwrap_err();
    assert!(matches!(err, IngestError::MalformedFrame(_)));
}

#[test]
fn test_oversized_session_id_rejected_on_encode() {
    let frame = Frame {
        session_id: "x".repeat(SESSION_ID_LEN + 1),
        stream: StreamKind::Audio,
        index: 0,
        payload: vec![],
    };

    assert!(matches!(
        frame.encode().unwrap_err(),
        IngestError::MalformedFrame(_)
    ));
}

#[test]
fn test_stream_tags() {
    assert_eq!(StreamKind::Audio.tag(), b'a');
    assert_eq!(StreamKind::Video.tag(), b'f');
    assert_eq!(StreamKind::from_tag(b'a'), Some(StreamKind::Audio));
    assert_eq!(StreamKind::from_tag(b'f'), Some(StreamKind::Video));
    assert_eq!(StreamKind::from_tag(b'z'), None);
}
