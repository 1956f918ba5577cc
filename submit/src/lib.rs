//! Version adaptation and remote submission protocol for the simrun client
//! (components C3 and C4).
//!

mod client;
mod token;
mod version;
mod wire;

pub use client::{RunSubmission, SubmissionClient, SubmitOutcome, CLIENT_VERSION, DEFAULT_ENDPOINT};
pub use token::fetch_access_token;
pub use version::{adapt, rescale_seed, EngineVersion, NEWEST_MAJOR};
pub use wire::{build_fred_args, FredArg, PopulationWire, RunRequest, SubmitRequest};
