//! Durable persistence for completed units.
//!
//! A commit is two writes: the blob itself (atomic write-then-rename) and a
//! structured record appended to the session's per-stream collection. Both
//! sides are exposed here; neither is visible to callers as anything other
//! than "store this blob" and "append this record".

pub mod blob;
pub mod records;

pub use blob::{mime_type, stream_subdir, BlobStore};
pub use records::{CommittedRecord, JsonRecordStore, RecordStore};
