//! Per-session reconciliation of independently-arriving metadata and blobs.
//!
//! Each logical unit (audio chunk or video frame) reaches the server in two
//! halves with no ordering guarantee between them. The buffer here pairs
//! them by sequence index and hands exactly one complete unit per index to
//! the persistence layer, whichever half arrived first.

pub mod buffer;
pub mod unit;

pub use buffer::{Offer, StreamBuffer};
pub use unit::{CompleteUnit, PendingUnit, UnitMetadata};
