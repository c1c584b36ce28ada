use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::protocol::StreamKind;
use crate::reconcile::StreamBuffer;

/// Lifecycle state of a media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Accepting metadata and blobs.
    Active,
    /// Client sent `session_complete`; acceptance stopped.
    Completed,
    /// Idle past the timeout window; evicted by the sweeper.
    Abandoned,
}

/// All mutable state for one session.
///
/// Lives inside the registry behind a per-session mutex; everything here is
/// read and written only under that lock.
#[derive(Debug)]
pub struct SessionState {
    pub session_id: String,
    pub storage_path: PathBuf,
    pub status: SessionStatus,
    /// Committed audio chunks.
    pub audio_count: usize,
    /// Committed video frames.
    pub video_count: usize,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Whether a WebSocket is currently attached to this session.
    pub connected: bool,
    audio_buffer: StreamBuffer,
    video_buffer: StreamBuffer,
}

impl SessionState {
    pub fn new(session_id: String, storage_path: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            storage_path,
            status: SessionStatus::Active,
            audio_count: 0,
            video_count: 0,
            started_at: now,
            last_activity: now,
            connected: false,
            audio_buffer: StreamBuffer::new(),
            video_buffer: StreamBuffer::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Indices are scoped per stream, so each stream gets its own buffer.
    pub fn buffer_mut(&mut self, stream: StreamKind) -> &mut StreamBuffer {
        match stream {
            StreamKind::Audio => &mut self.audio_buffer,
            StreamKind::Video => &mut self.video_buffer,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Bump the completed count for a stream as part of a commit.
    pub fn record_commit(&mut self, stream: StreamKind) {
        match stream {
            StreamKind::Audio => self.audio_count += 1,
            StreamKind::Video => self.video_count += 1,
        }
        self.touch();
    }

    /// Drop all partial entries from both buffers. Returns how many.
    pub fn drain_buffers(&mut self) -> usize {
        self.audio_buffer.drain() + self.video_buffer.drain()
    }

    pub fn pending_total(&self) -> usize {
        self.audio_buffer.pending_len() + self.video_buffer.pending_len()
    }
}
