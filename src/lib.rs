pub mod config;
pub mod error;
pub mod http;
pub mod ingest;
pub mod protocol;
pub mod reconcile;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::IngestError;
pub use http::{create_router, AppState};
pub use ingest::{run_connection, MediaPipeline, Transport};
pub use protocol::{ControlMessage, Frame, OutboundMessage, StreamKind};
pub use reconcile::{CompleteUnit, Offer, PendingUnit, StreamBuffer, UnitMetadata};
pub use session::{SessionRegistry, SessionStatus, SessionStatusReport};
pub use storage::{BlobStore, CommittedRecord, JsonRecordStore, RecordStore};
