use super::state::AppState;
use crate::ingest::run_connection;
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /ws/media-stream
/// Upgrade to the bidirectional media connection.
pub async fn media_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    info!("Media stream connection upgrading");
    let pipeline = Arc::clone(&state.pipeline);
    ws.on_upgrade(move |socket| run_connection(socket, pipeline))
}

/// GET /sessions/:session_id/status
/// Snapshot of a session: lifecycle state, per-stream counts, timestamps,
/// connectivity.
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry().status(&session_id).await {
        Some(report) => (StatusCode::OK, Json(report)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
