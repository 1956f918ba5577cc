//! Job construction and concurrent execution over a sweep of runs (§4.9).
//!

use crate::cache::{self, JobModel, JobRunEntry};
use crate::config::JobConfig;
use crate::results::JobResults;
use serde::{Deserialize, Serialize};
use simrun_common::{ClientConfig, ClientError, Result};
use simrun_fs::Status;
use simrun_params::ModelParams;
use simrun_run::{Run, DEFAULT_SIZE};
use simrun_submit::EngineVersion;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default bound on the number of runs submitted concurrently by
/// `Job::execute`, per §5.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// One row of [`Job::run_meta`]: the normalized configuration of a single
/// run within the job, per §4.9.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunMetaRow {
    pub run_id: u64,
    pub program: String,
    pub synth_pop: String,
    pub locations: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub params: Option<ModelParams>,
    pub seed: u64,
    pub size: String,
}

/// A sweep of runs submitted, tracked and aggregated as one unit.
pub struct Job {
    config: ClientConfig,
    program: String,
    key: String,
    results_dir: PathBuf,
    runs: Vec<Run>,
    concurrency: usize,
}

impl Job {
    /// Expand `job_config` into one `Run` per resulting `RunParams`, each
    /// writing to `results_dir/key/<i>` (§4.9).
    pub fn new(
        config: ClientConfig,
        job_config: JobConfig,
        key: impl Into<String>,
        results_dir: impl Into<PathBuf>,
        size: impl Into<String>,
        engine_version: EngineVersion,
    ) -> Result<Self> {
        let key = key.into();
        let results_dir = results_dir.into();
        let size = size.into();
        let program = job_config.program();

        let expanded = job_config.expand()?;
        let runs = expanded
            .into_iter()
            .enumerate()
            .map(|(i, params)| {
                let output_dir = results_dir.join(&key).join(i.to_string());
                Run::new(config.clone(), params, output_dir, size.clone(), engine_version.clone())
            })
            .collect();

        Ok(Self {
            config,
            program,
            key,
            results_dir,
            runs,
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Write `job.json` under the cache, then call `Run::execute` on every
    /// owned run, bounded by a worker pool of `concurrency` permits
    /// (default [`DEFAULT_CONCURRENCY`]), per §5.
    #[tracing::instrument(skip(self), fields(key = %self.key, n_runs = self.runs.len()))]
    pub async fn execute(&self) -> Result<()> {
        self.write_cache()?;

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(self.runs.len());
        for run in &self.runs {
            let run = Arc::new(run.clone());
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("job semaphore is never closed");
                run.execute().await
            }));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| ClientError::RemoteServerError(e.to_string()))??;
        }
        Ok(())
    }

    fn write_cache(&self) -> Result<()> {
        let model = JobModel {
            program: self.program.clone(),
            runs: self
                .runs
                .iter()
                .map(|r| JobRunEntry {
                    params: r.params().clone(),
                    output_dir: r.output_dir().to_path_buf(),
                    size: r.size().to_string(),
                    fred_version: r.engine_version().as_str().to_string(),
                })
                .collect(),
            key: self.key.clone(),
            results_dir: self.results_dir.clone(),
        };
        cache::write(&self.config, &model)
    }

    /// One row per run, per §4.9.
    pub fn run_meta(&self) -> Vec<RunMetaRow> {
        self.runs
            .iter()
            .enumerate()
            .map(|(i, run)| {
                let params = run.params();
                RunMetaRow {
                    run_id: i as u64,
                    program: params.program.clone(),
                    synth_pop: params.pop.name.clone(),
                    locations: params.pop.locations.clone(),
                    start_date: params.start_date.as_ref().map(|d| d.raw().to_string()),
                    end_date: params.end_date.as_ref().map(|d| d.raw().to_string()),
                    params: params.model_params.clone(),
                    seed: params.seed,
                    size: run.size().to_string(),
                }
            })
            .collect()
    }

    /// Aggregated status across component runs, per §4.9's lattice:
    /// `NOT STARTED` if all are; else `ERROR` if any errored; else
    /// `RUNNING` if any unfinished; else `DONE`.
    pub fn status(&self) -> Status {
        let statuses: Vec<Status> = self.runs.iter().map(Run::status).collect();

        if statuses.iter().all(|s| *s == Status::NotStarted) {
            return Status::NotStarted;
        }
        if statuses.iter().any(|s| *s == Status::Error) {
            return Status::Error;
        }
        if statuses.iter().any(|s| *s != Status::Done) {
            return Status::Running;
        }
        Status::Done
    }

    /// Job Result Aggregator over completed (`Status::Done`) runs, per
    /// §4.10.
    pub fn results(&self) -> JobResults {
        let readers = self
            .runs
            .iter()
            .enumerate()
            .filter_map(|(i, run)| run.results().map(|reader| (i as u64, reader)))
            .collect();
        JobResults::new(readers)
    }

    /// Restore a `Job` from its cached `job.json`, reconstructing each
    /// component run from its own cache entry.
    pub fn from_key(config: ClientConfig, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let model = cache::read(&config, &key)?;

        let runs = model
            .runs
            .iter()
            .map(|entry| {
                let engine_version = EngineVersion::parse(&entry.fred_version).map_err(|e| {
                    ClientError::CorruptCache {
                        path: entry.output_dir.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Run::new(
                    config.clone(),
                    entry.params.clone(),
                    entry.output_dir.clone(),
                    entry.size.clone(),
                    engine_version,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            program: model.program,
            key,
            results_dir: model.results_dir,
            runs,
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn results_dir(&self) -> &std::path::Path {
        &self.results_dir
    }
}
