use chrono::{DateTime, Utc};

/// Metadata half of a logical unit, extracted from a control message.
///
/// Audio chunks and video frames share this shape; the last two fields are
/// only populated for video frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitMetadata {
    pub start_timestamp: Option<DateTime<Utc>>,
    pub end_timestamp: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    /// Size the client declared. The committed record always carries the
    /// actual blob length; this is only compared against it for logging.
    pub declared_size: Option<u64>,
    /// Index of the audio chunk a video frame was sampled during.
    pub chunk_index: Option<u32>,
    /// Millisecond offset of a video frame into its owning audio chunk.
    pub offset_ms: Option<u64>,
}

/// Arrival state of one logical unit awaiting its other half.
///
/// Metadata and blob arrive independently on the same connection; whichever
/// comes first creates the entry and the second merges into it. A repeat of
/// a half it already holds replaces that half, so merging is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingUnit {
    MetadataOnly(UnitMetadata),
    BlobOnly(Vec<u8>),
    Complete(UnitMetadata, Vec<u8>),
}

impl PendingUnit {
    /// Merge a metadata arrival into this unit.
    pub fn merge_metadata(self, metadata: UnitMetadata) -> Self {
        match self {
            PendingUnit::MetadataOnly(_) => PendingUnit::MetadataOnly(metadata),
            PendingUnit::BlobOnly(blob) | PendingUnit::Complete(_, blob) => {
                PendingUnit::Complete(metadata, blob)
            }
        }
    }

    /// Merge a blob arrival into this unit.
    pub fn merge_blob(self, blob: Vec<u8>) -> Self {
        match self {
            PendingUnit::BlobOnly(_) => PendingUnit::BlobOnly(blob),
            PendingUnit::MetadataOnly(metadata) | PendingUnit::Complete(metadata, _) => {
                PendingUnit::Complete(metadata, blob)
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PendingUnit::Complete(..))
    }
}

/// A unit with both halves present, taken out of the buffer for commit.
///
/// `attempts` counts prior failed commit attempts; a unit restored to the
/// buffer after a persistence failure comes back with it bumped.
#[derive(Debug, Clone)]
pub struct CompleteUnit {
    pub index: u32,
    pub metadata: UnitMetadata,
    pub blob: Vec<u8>,
    pub attempts: u32,
}
