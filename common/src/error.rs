//! Unified error type for the simrun client.
//!
//! Every fallible operation across the sweep expander, submission adapter,
//! path resolver, status reader and result reader returns this single enum.
//! None of these variants is retried by the core; callers decide.
//!

use std::path::PathBuf;

use thiserror::Error;

/// All error kinds produced by the simrun client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A date string on a `RunParams`/`ConfigSweep` could not be parsed.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// An explicit seed sequence did not have the length the sweep requires.
    #[error("seed count mismatch: expected {expected} seeds, got {got}")]
    SeedCountMismatch { expected: usize, got: usize },

    /// A `RunParams`/`ConfigSweep` violated a structural invariant not
    /// covered by a more specific variant above (e.g. an empty `locations`
    /// list on a `PopRef`).
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// `Run::execute` was called against an `output_dir` that already
    /// contains regular files.
    #[error(
        "run data already exists in output_dir: {0}. \
         call Run::delete to delete this data and reuse output_dir"
    )]
    RunExists(PathBuf),

    /// A cache JSON file exists but could not be parsed, or was only
    /// partially written.
    #[error("corrupt cache entry at {path}: {reason}")]
    CorruptCache { path: PathBuf, reason: String },

    /// A user-named artifact (CSV/text output) was requested but is absent.
    #[error("artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    /// A log line did not match the expected format for the engine version.
    #[error("malformed log line: {0}")]
    MalformedLog(String),

    /// The remote service rejected the run configuration itself.
    #[error("{0}")]
    RunConfigError(String),

    /// The remote service returned 401/403.
    #[error("Authorization error: {0}")]
    UnauthorizedUser(String),

    /// The remote service returned a 5xx or an otherwise unclassifiable
    /// response.
    #[error("remote server error: {0}")]
    RemoteServerError(String),

    /// The request never reached the remote service.
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// Filesystem I/O failure not covered by a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure not covered by a more specific
    /// variant.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A graph or CSV artifact did not match its expected structure.
    #[error("malformed artifact at {path}: {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    /// CSV parsing failure not covered by a more specific variant.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
