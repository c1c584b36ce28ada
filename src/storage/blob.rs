use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::protocol::StreamKind;

/// Subdirectory of a session's storage dir holding this stream's blobs.
pub fn stream_subdir(stream: StreamKind) -> &'static str {
    match stream {
        StreamKind::Audio => "audio",
        StreamKind::Video => "frames",
    }
}

/// Media type recorded for blobs of this stream. The browser sends
/// WebM-encoded audio chunks and JPEG still frames.
pub fn mime_type(stream: StreamKind) -> &'static str {
    match stream {
        StreamKind::Audio => "audio/webm",
        StreamKind::Video => "image/jpeg",
    }
}

fn blob_file_name(stream: StreamKind, index: u32) -> String {
    match stream {
        StreamKind::Audio => format!("chunk_{}.webm", index),
        StreamKind::Video => format!("frame_{}.jpg", index),
    }
}

/// Writes blob payloads under a session's storage directory.
///
/// Every write goes to a uniquely-named temp file in the destination
/// directory first and is renamed into place, so a reader (or a record
/// pointing at the path) never observes a truncated blob.
#[derive(Debug, Default)]
pub struct BlobStore;

impl BlobStore {
    pub fn new() -> Self {
        Self
    }

    /// Durably store one blob; returns the final path.
    pub async fn write(
        &self,
        session_dir: &Path,
        stream: StreamKind,
        index: u32,
        payload: &[u8],
    ) -> Result<PathBuf> {
        let dir = session_dir.join(stream_subdir(stream));
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create blob directory {:?}", dir))?;

        let final_path = dir.join(blob_file_name(stream, index));
        let tmp_path = dir.join(format!(".{}.tmp", Uuid::new_v4()));

        tokio::fs::write(&tmp_path, payload)
            .await
            .with_context(|| format!("Failed to write blob temp file {:?}", tmp_path))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
            // Leave no temp litter behind a failed rename.
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e).with_context(|| format!("Failed to move blob into {:?}", final_path));
        }

        debug!(
            "Stored {} blob index={} ({} bytes) at {:?}",
            stream,
            index,
            payload.len(),
            final_path
        );

        Ok(final_path)
    }
}
