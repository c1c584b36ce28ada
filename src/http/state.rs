use crate::ingest::MediaPipeline;
use crate::session::SessionRegistry;
use std::sync::Arc;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MediaPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<MediaPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.pipeline.registry()
    }
}
