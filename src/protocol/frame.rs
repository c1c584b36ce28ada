use crate::error::IngestError;
use std::fmt;

/// Width of the session-id field in the wire header.
pub const SESSION_ID_LEN: usize = 36;

/// Total fixed header length: session id + stream tag + big-endian u32 index.
pub const HEADER_LEN: usize = SESSION_ID_LEN + 1 + 4;

/// Which of the two media streams a unit belongs to.
///
/// Sequence indices are scoped per stream, so audio chunk 3 and video
/// frame 3 are unrelated units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Audio,
    Video,
}

impl StreamKind {
    /// One-byte tag used in the wire header.
    pub fn tag(self) -> u8 {
        match self {
            StreamKind::Audio => b'a',
            StreamKind::Video => b'f',
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'a' => Some(StreamKind::Audio),
            b'f' => Some(StreamKind::Video),
            _ => None,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Video => write!(f, "video"),
        }
    }
}

/// One binary wire unit: routing header plus blob payload.
///
/// Layout: bytes 0-35 session id (UTF-8 text, space-padded to 36 bytes),
/// byte 36 stream tag (`a` = audio chunk, `f` = video frame), bytes 37-40
/// big-endian u32 sequence index, bytes 41+ payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub session_id: String,
    pub stream: StreamKind,
    pub index: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Encode into the wire layout.
    ///
    /// Fails if the session id does not fit the fixed 36-byte field.
    pub fn encode(&self) -> Result<Vec<u8>, IngestError> {
        if self.session_id.len() > SESSION_ID_LEN {
            return Err(IngestError::MalformedFrame(format!(
                "session id is {} bytes, field is {}",
                self.session_id.len(),
                SESSION_ID_LEN
            )));
        }

        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buf.extend_from_slice(self.session_id.as_bytes());
        buf.resize(SESSION_ID_LEN, b' ');
        buf.push(self.stream.tag());
        buf.extend_from_slice(&self.index.to_be_bytes());
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }

    /// Decode a binary message received off the wire.
    ///
    /// The session id is trimmed of its space padding. Fails with
    /// `MalformedFrame` when the message is shorter than the fixed header,
    /// the stream tag is unrecognized, or the id field is not valid UTF-8.
    pub fn decode(bytes: &[u8]) -> Result<Self, IngestError> {
        if bytes.len() < HEADER_LEN {
            return Err(IngestError::MalformedFrame(format!(
                "{} bytes is shorter than the {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }

        let session_id = std::str::from_utf8(&bytes[..SESSION_ID_LEN])
            .map_err(|_| {
                IngestError::MalformedFrame("session id field is not valid UTF-8".to_string())
            })?
            .trim_end_matches(' ')
            .to_string();

        let tag = bytes[SESSION_ID_LEN];
        let stream = StreamKind::from_tag(tag).ok_or_else(|| {
            IngestError::MalformedFrame(format!("unrecognized stream tag 0x{:02x}", tag))
        })?;

        let mut index_bytes = [0u8; 4];
        index_bytes.copy_from_slice(&bytes[SESSION_ID_LEN + 1..HEADER_LEN]);
        let index = u32::from_be_bytes(index_bytes);

        Ok(Self {
            session_id,
            stream,
            index,
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }
}
