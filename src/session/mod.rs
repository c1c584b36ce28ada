//! Session lifecycle and ownership.
//!
//! The registry is the single owner of per-session mutable state. Every
//! other component reaches a session only through its handle's lock, which
//! is what makes commits, duplicate detection, and idle eviction safe to
//! run from many connections at once.

mod registry;
mod state;
mod status;

pub use registry::{SessionHandle, SessionRegistry};
pub use state::{SessionState, SessionStatus};
pub use status::SessionStatusReport;
