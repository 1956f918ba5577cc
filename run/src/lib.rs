//! The Run lifecycle for the simrun client (component C8).
//!

mod cache;
mod run;

pub use run::{Run, DEFAULT_SIZE};
