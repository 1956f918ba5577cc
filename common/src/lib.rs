//! Shared plumbing for the simrun client crates: configuration, error types,
//! path helpers and logging setup.
//!

mod config;
mod error;
mod logging;
mod macros;

pub use config::*;
pub use error::*;
pub use logging::*;
