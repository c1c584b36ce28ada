use anyhow::{bail, Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::state::{SessionState, SessionStatus};
use super::status::SessionStatusReport;
use crate::storage::stream_subdir;
use crate::protocol::StreamKind;

/// Owner of one session's mutable state.
///
/// The inner mutex is the per-session critical section: reconciliation,
/// commits, counter updates, and eviction for a session all run under it,
/// so near-simultaneous arrivals for the same index cannot both create an
/// entry, and the sweeper can never evict mid-commit.
pub struct SessionHandle {
    state: Mutex<SessionState>,
}

impl SessionHandle {
    fn new(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }
}

/// Registry of all known sessions.
///
/// Creates sessions on first init, hands out `Arc<SessionHandle>`s to the
/// ingest pipeline, and runs the idle sweeper. Terminal sessions stay in
/// the map so their status remains queryable; their buffers are drained and
/// their storage is closed, not deleted.
pub struct SessionRegistry {
    base_path: PathBuf,
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Initialize a session, creating its storage layout on first sight.
    ///
    /// Idempotent: a repeat init for a known id returns the existing handle
    /// without touching its state.
    pub async fn init(&self, session_id: &str) -> Result<Arc<SessionHandle>> {
        validate_session_id(session_id)?;

        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(session_id) {
                return Ok(Arc::clone(handle));
            }
        }

        let storage_path = self.create_session_storage(session_id).await?;

        let mut sessions = self.sessions.write().await;
        // Another connection may have initialized the same id while we were
        // creating directories; keep whichever entry landed first.
        if let Some(handle) = sessions.get(session_id) {
            return Ok(Arc::clone(handle));
        }

        info!("Session {} created at {:?}", session_id, storage_path);
        let handle = Arc::new(SessionHandle::new(SessionState::new(
            session_id.to_string(),
            storage_path,
        )));
        sessions.insert(session_id.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<SessionHandle>> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(Arc::clone)
    }

    /// Status snapshot for the HTTP surface.
    pub async fn status(&self, session_id: &str) -> Option<SessionStatusReport> {
        let handle = self.get(session_id).await?;
        let state = handle.lock().await;
        Some(SessionStatusReport::from_state(&state))
    }

    pub async fn set_connected(&self, session_id: &str, connected: bool) {
        if let Some(handle) = self.get(session_id).await {
            let mut state = handle.lock().await;
            state.connected = connected;
        }
    }

    /// One pass of idle eviction: any active session without activity inside
    /// the timeout window moves to `abandoned` and its buffers drain.
    /// Returns how many sessions were abandoned.
    pub async fn sweep_idle(&self, idle_timeout: ChronoDuration) -> usize {
        let cutoff = Utc::now() - idle_timeout;

        let handles: Vec<(String, Arc<SessionHandle>)> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .map(|(id, handle)| (id.clone(), Arc::clone(handle)))
                .collect()
        };

        let mut abandoned = 0;
        for (session_id, handle) in handles {
            let mut state = handle.lock().await;
            if state.status == SessionStatus::Active && state.last_activity < cutoff {
                let dropped = state.drain_buffers();
                state.status = SessionStatus::Abandoned;
                state.connected = false;
                warn!(
                    "Session {} abandoned after idle timeout ({} partial unit(s) dropped)",
                    session_id, dropped
                );
                abandoned += 1;
            }
        }
        abandoned
    }

    /// Spawn the periodic idle sweep as a background task.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        sweep_interval: Duration,
        idle_timeout: ChronoDuration,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.tick().await; // first tick is immediate
            loop {
                ticker.tick().await;
                let abandoned = registry.sweep_idle(idle_timeout).await;
                if abandoned > 0 {
                    info!("Idle sweep abandoned {} session(s)", abandoned);
                }
            }
        })
    }

    async fn create_session_storage(&self, session_id: &str) -> Result<PathBuf> {
        let session_path = self.base_path.join(session_id);
        for stream in [StreamKind::Audio, StreamKind::Video] {
            let dir = session_path.join(stream_subdir(stream));
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create session storage {:?}", dir))?;
        }
        Ok(session_path)
    }
}

/// Session ids are untrusted client strings that become path components;
/// only a conservative character set is allowed through.
fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() || session_id.len() > crate::protocol::SESSION_ID_LEN {
        bail!(
            "session id must be 1-{} bytes, got {}",
            crate::protocol::SESSION_ID_LEN,
            session_id.len()
        );
    }
    if !session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!("session id contains characters outside [A-Za-z0-9_-]");
    }
    Ok(())
}
