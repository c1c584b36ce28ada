use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Control messages received as JSON text frames on the media connection.
///
/// The control plane and the binary blob plane share one connection and are
/// independently timed: metadata for an index may arrive before or after the
/// blob carrying the same index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// First message of a session. Idempotent: a repeat init for a known
    /// session id acks with the existing state.
    SessionInit { session_id: String },

    /// Metadata half of an audio chunk.
    AudioMetadata {
        session_id: String,
        chunk_index: u32,
        start_timestamp: Option<DateTime<Utc>>,
        end_timestamp: Option<DateTime<Utc>>,
        duration_ms: Option<u64>,
        size_bytes: Option<u64>,
    },

    /// Metadata half of a video frame. Carries the index of the audio chunk
    /// the frame was sampled during, plus the millisecond offset into it.
    FrameMetadata {
        session_id: String,
        frame_index: u32,
        chunk_index: Option<u32>,
        timestamp: Option<DateTime<Utc>>,
        offset_ms: Option<u64>,
        size_bytes: Option<u64>,
    },

    /// Explicit end of session. Acceptance stops immediately.
    SessionComplete { session_id: String },

    /// Keepalive.
    Ping,
}

impl ControlMessage {
    /// The session the message addresses, if it addresses one.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            ControlMessage::SessionInit { session_id }
            | ControlMessage::AudioMetadata { session_id, .. }
            | ControlMessage::FrameMetadata { session_id, .. }
            | ControlMessage::SessionComplete { session_id } => Some(session_id),
            ControlMessage::Ping => None,
        }
    }
}

/// Messages sent back to the client. Every accepted unit is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    SessionInitAck { session_id: String, status: String },
    AudioAck { index: u32 },
    FrameAck { index: u32 },
    CompleteAck,
    Pong,
}
