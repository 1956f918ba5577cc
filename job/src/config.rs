//! Job configuration input (§4.9): either a full [`ConfigSweep`] or an
//! already-expanded sequence of single configs.
//!

use simrun_common::Result;
use simrun_params::{ConfigSweep, RunParams};

/// What a [`crate::Job`] is constructed from.
#[derive(Clone, Debug)]
pub enum JobConfig {
    Sweep(ConfigSweep),
    Explicit(Vec<RunParams>),
}

impl JobConfig {
    pub(crate) fn expand(&self) -> Result<Vec<RunParams>> {
        match self {
            JobConfig::Sweep(sweep) => Ok(sweep.expand()?.into_vec()),
            JobConfig::Explicit(params) => Ok(params.clone()),
        }
    }

    /// The `program` field of the `Job` struct itself (§3): the sweep's
    /// shared program for a `Sweep`, or the first run's program for an
    /// already-expanded `Explicit` list (every run in one job is expected
    /// to share a program; a caller mixing programs within one job gets
    /// the first one here).
    pub(crate) fn program(&self) -> String {
        match self {
            JobConfig::Sweep(sweep) => sweep.program.clone(),
            JobConfig::Explicit(params) => {
                params.first().map(|p| p.program.clone()).unwrap_or_default()
            }
        }
    }
}

impl From<ConfigSweep> for JobConfig {
    fn from(sweep: ConfigSweep) -> Self {
        JobConfig::Sweep(sweep)
    }
}

impl From<Vec<RunParams>> for JobConfig {
    fn from(params: Vec<RunParams>) -> Self {
        JobConfig::Explicit(params)
    }
}
