use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{SessionState, SessionStatus};

/// Snapshot of a session returned by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusReport {
    pub session_id: String,
    pub status: SessionStatus,
    pub total_chunks: usize,
    pub total_frames: usize,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub is_connected: bool,
}

impl SessionStatusReport {
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            session_id: state.session_id.clone(),
            status: state.status,
            total_chunks: state.audio_count,
            total_frames: state.video_count,
            started_at: state.started_at,
            last_activity: state.last_activity,
            is_connected: state.connected,
        }
    }
}
