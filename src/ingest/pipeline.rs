use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::IngestError;
use crate::protocol::{ControlMessage, Frame, OutboundMessage, StreamKind, HEADER_LEN};
use crate::reconcile::{CompleteUnit, Offer, UnitMetadata};
use crate::session::{SessionRegistry, SessionState, SessionStatus};
use crate::storage::{mime_type, BlobStore, CommittedRecord, RecordStore};

/// One half of a logical unit, as it arrives off the wire.
enum Half {
    Metadata(UnitMetadata),
    Blob(Vec<u8>),
}

/// The dispatch core: classifies incoming messages, drives reconciliation,
/// and commits completed units.
///
/// Shared across all connections. Per-session work happens under the
/// session's own lock; nothing here serializes across sessions.
pub struct MediaPipeline {
    registry: Arc<SessionRegistry>,
    blob_store: BlobStore,
    record_store: Arc<dyn RecordStore>,
    max_payload_bytes: usize,
    max_commit_attempts: u32,
}

impl MediaPipeline {
    pub fn new(
        registry: Arc<SessionRegistry>,
        record_store: Arc<dyn RecordStore>,
        max_payload_bytes: usize,
        max_commit_attempts: u32,
    ) -> Self {
        Self {
            registry,
            blob_store: BlobStore::new(),
            record_store,
            max_payload_bytes,
            max_commit_attempts,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Handle a JSON control message. Returns the reply to send, if any.
    pub async fn handle_text(&self, text: &str) -> Result<Option<OutboundMessage>, IngestError> {
        let message: ControlMessage = serde_json::from_str(text)?;

        match message {
            ControlMessage::SessionInit { session_id } => {
                let handle = self
                    .registry
                    .init(&session_id)
                    .await
                    .map_err(IngestError::SessionSetup)?;
                let status = {
                    let mut state = handle.lock().await;
                    // A terminal session answers the init but is neither
                    // connected nor active again.
                    if state.is_active() {
                        state.connected = true;
                        state.touch();
                    }
                    match state.status {
                        SessionStatus::Active => "ready",
                        SessionStatus::Completed => "completed",
                        SessionStatus::Abandoned => "abandoned",
                    }
                };
                Ok(Some(OutboundMessage::SessionInitAck {
                    session_id,
                    status: status.to_string(),
                }))
            }

            ControlMessage::AudioMetadata {
                session_id,
                chunk_index,
                start_timestamp,
                end_timestamp,
                duration_ms,
                size_bytes,
            } => {
                let metadata = UnitMetadata {
                    start_timestamp,
                    end_timestamp,
                    duration_ms,
                    declared_size: size_bytes,
                    chunk_index: None,
                    offset_ms: None,
                };
                self.accept(
                    &session_id,
                    StreamKind::Audio,
                    chunk_index,
                    Half::Metadata(metadata),
                )
                .await
            }

            ControlMessage::FrameMetadata {
                session_id,
                frame_index,
                chunk_index,
                timestamp,
                offset_ms,
                size_bytes,
            } => {
                let metadata = UnitMetadata {
                    start_timestamp: timestamp,
                    end_timestamp: None,
                    duration_ms: None,
                    declared_size: size_bytes,
                    chunk_index,
                    offset_ms,
                };
                self.accept(
                    &session_id,
                    StreamKind::Video,
                    frame_index,
                    Half::Metadata(metadata),
                )
                .await
            }

            ControlMessage::SessionComplete { session_id } => {
                self.complete_session(&session_id).await?;
                Ok(Some(OutboundMessage::CompleteAck))
            }

            ControlMessage::Ping => Ok(Some(OutboundMessage::Pong)),
        }
    }

    /// Handle a binary blob message. Returns the ack to send, if any.
    pub async fn handle_binary(&self, bytes: &[u8]) -> Result<Option<OutboundMessage>, IngestError> {
        if bytes.len() > HEADER_LEN + self.max_payload_bytes {
            return Err(IngestError::PayloadTooLarge {
                actual: bytes.len() - HEADER_LEN,
                cap: self.max_payload_bytes,
            });
        }

        let Frame {
            session_id,
            stream,
            index,
            payload,
        } = Frame::decode(bytes)?;
        self.accept(&session_id, stream, index, Half::Blob(payload)).await
    }

    /// Route one half of a unit into its session's buffer and commit if the
    /// unit is now complete. Runs entirely under the session lock.
    async fn accept(
        &self,
        session_id: &str,
        stream: StreamKind,
        index: u32,
        half: Half,
    ) -> Result<Option<OutboundMessage>, IngestError> {
        let handle = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| IngestError::UnknownSession(session_id.to_string()))?;

        let mut state = handle.lock().await;

        if !state.is_active() {
            return Err(IngestError::SessionClosed(session_id.to_string()));
        }

        let offer = match half {
            Half::Metadata(metadata) => state.buffer_mut(stream).offer_metadata(index, metadata),
            Half::Blob(blob) => state.buffer_mut(stream).offer_blob(index, blob),
        };

        match offer {
            Offer::Pending => {
                state.touch();
                Ok(None)
            }
            Offer::Duplicate => {
                warn!(
                    "Duplicate arrival for session {} {} index {}; already committed",
                    session_id, stream, index
                );
                // Re-acknowledge so a client that missed the first ack
                // stops resending.
                Ok(Some(ack_for(stream, index)))
            }
            Offer::Ready(unit) => self.commit_unit(&mut state, stream, unit).await,
        }
    }

    /// Commit one complete unit: blob file, record append, counters. On
    /// persistence failure the unit goes back into the buffer for retry on
    /// the next related arrival, up to the attempt bound.
    async fn commit_unit(
        &self,
        state: &mut SessionState,
        stream: StreamKind,
        unit: CompleteUnit,
    ) -> Result<Option<OutboundMessage>, IngestError> {
        let index = unit.index;

        match self.persist(state, stream, &unit).await {
            Ok(()) => {
                state.buffer_mut(stream).mark_committed(index);
                state.record_commit(stream);
                info!(
                    "Committed {} index {} for session {} ({} bytes)",
                    stream,
                    index,
                    state.session_id,
                    unit.blob.len()
                );
                Ok(Some(ack_for(stream, index)))
            }
            Err(IngestError::DuplicateCommit { .. }) => {
                // The record already exists (e.g. written before a restart
                // left the in-memory committed set behind). Treat as done.
                state.buffer_mut(stream).mark_committed(index);
                warn!(
                    "Record for session {} {} index {} already present; dropping repeat",
                    state.session_id, stream, index
                );
                Ok(Some(ack_for(stream, index)))
            }
            Err(e) => {
                let attempts = unit.attempts + 1;
                if attempts >= self.max_commit_attempts {
                    error!(
                        "Dropping {} index {} for session {} after {} failed commit attempts: {}",
                        stream, index, state.session_id, attempts, e
                    );
                } else {
                    state.buffer_mut(stream).restore(unit);
                }
                Err(e)
            }
        }
    }

    async fn persist(
        &self,
        state: &SessionState,
        stream: StreamKind,
        unit: &CompleteUnit,
    ) -> Result<(), IngestError> {
        let actual_size = unit.blob.len() as u64;

        if let Some(declared) = unit.metadata.declared_size {
            if declared != actual_size {
                warn!(
                    "Session {} {} index {}: declared size {} differs from actual {}",
                    state.session_id, stream, unit.index, declared, actual_size
                );
            }
        }

        let file_path = self
            .blob_store
            .write(&state.storage_path, stream, unit.index, &unit.blob)
            .await
            .map_err(|cause| IngestError::PersistenceFailure {
                stream,
                index: unit.index,
                cause,
            })?;

        let record = CommittedRecord {
            index: unit.index,
            file_path: file_path.to_string_lossy().into_owned(),
            size_bytes: actual_size,
            mime_type: mime_type(stream).to_string(),
            start_timestamp: unit.metadata.start_timestamp,
            end_timestamp: unit.metadata.end_timestamp,
            duration_ms: unit.metadata.duration_ms,
            chunk_index: unit.metadata.chunk_index,
            offset_ms: unit.metadata.offset_ms,
            processed: false,
        };

        self.record_store
            .append(&state.session_id, stream, record)
            .await
    }

    /// Explicit end of session: stop acceptance, give units that already
    /// have both halves one last commit attempt, then drain.
    async fn complete_session(&self, session_id: &str) -> Result<(), IngestError> {
        let handle = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| IngestError::UnknownSession(session_id.to_string()))?;

        let mut state = handle.lock().await;

        if state.status != SessionStatus::Active {
            return Ok(());
        }
        state.status = SessionStatus::Completed;

        for stream in [StreamKind::Audio, StreamKind::Video] {
            let retryable = state.buffer_mut(stream).take_retryable();
            for unit in retryable {
                let index = unit.index;
                if let Err(e) = self.persist(&state, stream, &unit).await {
                    warn!(
                        "Best-effort commit of {} index {} failed at session end: {}",
                        stream, index, e
                    );
                } else {
                    state.buffer_mut(stream).mark_committed(index);
                    state.record_commit(stream);
                }
            }
        }

        let dropped = state.drain_buffers();
        info!(
            "Session {} completed ({} audio, {} video, {} partial unit(s) dropped)",
            session_id, state.audio_count, state.video_count, dropped
        );
        Ok(())
    }
}

fn ack_for(stream: StreamKind, index: u32) -> OutboundMessage {
    match stream {
        StreamKind::Audio => OutboundMessage::AudioAck { index },
        StreamKind::Video => OutboundMessage::FrameAck { index },
    }
}
