//! Path Resolver and Status Reader for the simrun client (components C5 and
//! C6).
//!

mod layout;
mod status;

pub use layout::{CountKind, PathResolver};
pub use status::{read_logs, read_status, LogEntry, LogLevel, Status};
