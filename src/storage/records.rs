use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::IngestError;
use crate::protocol::StreamKind;

/// Durable entry for one committed unit in a session's per-stream collection.
///
/// Immutable after commit except for `processed`, which belongs to the
/// downstream transcription/analysis pipeline and defaults to false here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommittedRecord {
    pub index: u32,
    pub file_path: String,
    /// Actual length of the stored blob, never the client-declared size.
    pub size_bytes: u64,
    pub mime_type: String,
    pub start_timestamp: Option<DateTime<Utc>>,
    pub end_timestamp: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    /// Owning audio-chunk index, video frames only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
    /// Offset into the owning audio chunk, video frames only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_ms: Option<u64>,
    #[serde(default)]
    pub processed: bool,
}

/// Append-only access to a session's per-stream record collections.
///
/// `append` is the whole contract: it hides whatever read-modify-write the
/// backing store needs, enforces one record per index, and tolerates
/// arbitrary append order. `load` returns the collection sorted by index.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append(
        &self,
        session_id: &str,
        stream: StreamKind,
        record: CommittedRecord,
    ) -> Result<(), IngestError>;

    async fn load(
        &self,
        session_id: &str,
        stream: StreamKind,
    ) -> Result<Vec<CommittedRecord>, IngestError>;
}

type CollectionCell = Arc<Mutex<Option<Vec<CommittedRecord>>>>;

/// Record store backed by one JSON array file per session and stream.
///
/// Appends build a new collection value and replace the file atomically
/// (temp write + rename); the previous value stays readable until the
/// rename lands. Each session+stream collection has its own mutex, held
/// across the file replacement, so concurrent commits for different
/// indices of one session serialize while unrelated sessions proceed in
/// parallel. The outer map lock is only held long enough to fetch a cell.
pub struct JsonRecordStore {
    base_path: PathBuf,
    collections: Mutex<HashMap<(String, StreamKind), CollectionCell>>,
}

impl JsonRecordStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            collections: Mutex::new(HashMap::new()),
        }
    }

    async fn cell(&self, session_id: &str, stream: StreamKind) -> CollectionCell {
        let mut collections = self.collections.lock().await;
        Arc::clone(
            collections
                .entry((session_id.to_string(), stream))
                .or_default(),
        )
    }

    fn collection_path(&self, session_id: &str, stream: StreamKind) -> PathBuf {
        let file = match stream {
            StreamKind::Audio => "audio_chunks.json",
            StreamKind::Video => "video_frames.json",
        };
        self.base_path.join(session_id).join("records").join(file)
    }

    async fn read_collection(path: &Path) -> anyhow::Result<Vec<CommittedRecord>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Corrupt record collection at {:?}", path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", path)),
        }
    }

    async fn write_collection(path: &Path, records: &[CommittedRecord]) -> anyhow::Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| anyhow!("record path {:?} has no parent directory", path))?;
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create record directory {:?}", dir))?;

        let tmp_path = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        let json = serde_json::to_vec_pretty(records).context("Failed to serialize records")?;

        tokio::fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("Failed to write record temp file {:?}", tmp_path))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e).with_context(|| format!("Failed to replace {:?}", path));
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn append(
        &self,
        session_id: &str,
        stream: StreamKind,
        record: CommittedRecord,
    ) -> Result<(), IngestError> {
        let index = record.index;
        let path = self.collection_path(session_id, stream);

        let cell = self.cell(session_id, stream).await;
        let mut slot = cell.lock().await;

        let current = match slot.as_mut() {
            Some(records) => records,
            None => {
                let existing = Self::read_collection(&path).await.map_err(|cause| {
                    IngestError::PersistenceFailure { stream, index, cause }
                })?;
                slot.insert(existing)
            }
        };

        if current.iter().any(|r| r.index == index) {
            return Err(IngestError::DuplicateCommit { stream, index });
        }

        // New collection value, then replace the file; the cache only moves
        // forward once the file did.
        let mut next = current.clone();
        next.push(record);

        Self::write_collection(&path, &next)
            .await
            .map_err(|cause| IngestError::PersistenceFailure { stream, index, cause })?;

        *current = next;
        Ok(())
    }

    async fn load(
        &self,
        session_id: &str,
        stream: StreamKind,
    ) -> Result<Vec<CommittedRecord>, IngestError> {
        let path = self.collection_path(session_id, stream);

        let cell = self.cell(session_id, stream).await;
        let mut slot = cell.lock().await;

        let current = match slot.as_mut() {
            Some(records) => records,
            None => {
                let existing = Self::read_collection(&path).await.map_err(|cause| {
                    IngestError::PersistenceFailure { stream, index: 0, cause }
                })?;
                slot.insert(existing)
            }
        };

        let mut records = current.clone();
        records.sort_by_key(|r| r.index);
        Ok(records)
    }
}
