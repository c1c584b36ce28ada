//! Wire protocol for the media stream connection.
//!
//! Two planes share one WebSocket: JSON control messages (session lifecycle
//! and per-unit metadata) and binary frames (blob payloads with a fixed
//! routing header). This module owns both encodings.

pub mod frame;
pub mod messages;

pub use frame::{Frame, StreamKind, HEADER_LEN, SESSION_ID_LEN};
pub use messages::{ControlMessage, OutboundMessage};
