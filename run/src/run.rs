//! The Run lifecycle (§4.8): submit, track status, and read results for one
//! simulation run.
//!

use crate::cache::{self, RunModel};
use simrun_common::{ClientConfig, ClientError, Result};
use simrun_fs::{read_status, PathResolver, Status};
use simrun_params::RunParams;
use simrun_results::RunResultReader;
use simrun_submit::{EngineVersion, RunSubmission, SubmissionClient};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default compute size requested when a caller does not specify one.
pub const DEFAULT_SIZE: &str = "hot_small";

/// One simulation run: its parameters, where it writes output, and the
/// compute size/engine version it was (or will be) submitted with.
#[derive(Clone, Debug)]
pub struct Run {
    config: ClientConfig,
    params: RunParams,
    output_dir: PathBuf,
    size: String,
    engine_version: EngineVersion,
}

impl Run {
    pub fn new(
        config: ClientConfig,
        params: RunParams,
        output_dir: impl Into<PathBuf>,
        size: impl Into<String>,
        engine_version: EngineVersion,
    ) -> Self {
        Self {
            config,
            params,
            output_dir: output_dir.into(),
            size: size.into(),
            engine_version,
        }
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn engine_version(&self) -> &EngineVersion {
        &self.engine_version
    }

    fn resolver(&self) -> PathResolver {
        PathResolver::new(&self.output_dir, self.engine_version.clone(), self.params.seed)
    }

    /// Submit the run to the remote service, per §4.8: refuse if
    /// `output_dir` already has regular files, otherwise write the cache
    /// entry and delegate to the Submission Adapter.
    #[tracing::instrument(skip(self), fields(output_dir = %self.output_dir.display()))]
    pub async fn execute(&self) -> Result<()> {
        if contains_regular_file(&self.output_dir)? {
            return Err(ClientError::RunExists(self.output_dir.clone()));
        }

        std::fs::create_dir_all(&self.output_dir)?;

        cache::write(
            &self.config,
            &RunModel {
                params: self.params.clone(),
                output_dir: self.output_dir.clone(),
                size: self.size.clone(),
                fred_version: self.engine_version.as_str().to_string(),
            },
        )?;

        let client = SubmissionClient::new(self.config.clone());
        let submission = RunSubmission {
            params: &self.params,
            output_dir: &self.output_dir,
            size: &self.size,
            version: &self.engine_version,
        };
        client.submit(&submission).await?;
        Ok(())
    }

    pub fn status(&self) -> Status {
        read_status(&self.resolver())
    }

    /// The Run Result Reader, if the run has finished successfully. Absent
    /// (rather than erroring) while the run is still in progress or has not
    /// started, per §4.8.
    pub fn results(&self) -> Option<RunResultReader> {
        match self.status() {
            Status::Done => Some(RunResultReader::new(self.resolver())),
            _ => None,
        }
    }

    /// Recursively remove `output_dir`. Destructive; no undo. When
    /// `interactive` is set the caller is expected to have already
    /// confirmed with the user — this method itself never prompts, since a
    /// library has no terminal to prompt on (left to the CLI layer, which
    /// does the actual prompting before calling this).
    pub fn delete(&self, interactive: bool) -> Result<()> {
        let _ = interactive;
        if self.output_dir.exists() {
            std::fs::remove_dir_all(&self.output_dir)?;
        }
        Ok(())
    }

    /// Reconstruct a `Run` by reading the cache entry keyed by `output_dir`.
    pub fn from_output_dir(config: ClientConfig, output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref();
        let model = cache::read(&config, output_dir)?;
        let engine_version = EngineVersion::parse(&model.fred_version).map_err(|e| {
            ClientError::CorruptCache {
                path: output_dir.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            config,
            params: model.params,
            output_dir: model.output_dir,
            size: model.size,
            engine_version,
        })
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Run(output_dir={}, size={}, engine_version={}, status={})",
            self.output_dir.display(),
            self.size,
            self.engine_version,
            self.status()
        )
    }
}

impl PartialEq for Run {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.output_dir == other.output_dir
            && self.size == other.size
            && self.engine_version.as_str() == other.engine_version.as_str()
    }
}

fn contains_regular_file(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}
