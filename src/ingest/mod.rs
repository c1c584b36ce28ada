//! Connection transport and message dispatch.
//!
//! One WebSocket per session carries both planes of the protocol. The
//! pipeline here is the glue between the codec, the reconciliation buffers,
//! the persistence layer, and the registry.

mod connection;
mod pipeline;
mod transport;

pub use connection::run_connection;
pub use pipeline::MediaPipeline;
pub use transport::{Transport, WebSocketTransport};
