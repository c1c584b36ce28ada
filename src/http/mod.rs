//! HTTP surface: the WebSocket upgrade for media ingest plus a small
//! read-only API:
//! - GET /ws/media-stream - upgrade to the media connection
//! - GET /sessions/:id/status - query session state and counters
//! - GET /health - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
