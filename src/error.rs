use crate::protocol::StreamKind;
use thiserror::Error;

/// Errors raised while ingesting a media stream.
///
/// None of these are fatal to the process: a bad unit affects only its own
/// session and index. The connection loop maps each variant to its handling
/// policy (drop + log, no ack, retry) and keeps the socket open.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Binary message shorter than the fixed header, or an unrecognized
    /// stream tag. Dropped; connection stays open.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Message referenced a session id that was never initialized.
    /// Dropped without an ack.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// Message referenced a session that already completed or was abandoned.
    /// Dropped without an ack.
    #[error("session {0} is no longer accepting data")]
    SessionClosed(String),

    /// Arrival for an index that already has a committed record. Idempotent
    /// no-op, logged at warn.
    #[error("duplicate commit for {stream} index {index}")]
    DuplicateCommit { stream: StreamKind, index: u32 },

    /// Durable blob write or record append failed. The unit stays pending
    /// and is retried on the next related arrival, up to a bounded number
    /// of attempts.
    #[error("persistence failure for {stream} index {index}: {cause}")]
    PersistenceFailure {
        stream: StreamKind,
        index: u32,
        cause: anyhow::Error,
    },

    /// Binary message payload exceeded the configured cap. Dropped.
    #[error("payload of {actual} bytes exceeds cap of {cap} bytes")]
    PayloadTooLarge { actual: usize, cap: usize },

    /// Text message that is not valid JSON or not a known control message.
    #[error("unparseable control message: {0}")]
    BadControlMessage(#[from] serde_json::Error),

    /// Session initialization was rejected (invalid id) or its storage
    /// layout could not be created.
    #[error("session setup failed: {0}")]
    SessionSetup(anyhow::Error),
}
