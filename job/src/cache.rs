//! On-disk cache record for one job, keyed by its `key`.
//!
//! Per §6.3, the persisted shape is `{ program, runs: [_RunModel…], key,
//! results_dir }` — component runs are embedded directly (as their own
//! `_RunModel` shape) rather than referenced by path, so the ledger
//! doubles as a human-readable snapshot of the whole job even if the
//! individual runs' own cache entries are later lost.
//!

use serde::{Deserialize, Serialize};
use simrun_common::{ClientConfig, ClientError, Result};
use simrun_params::RunParams;
use std::path::PathBuf;

/// One entry of `JobModel::runs`: the same `_RunModel` shape persisted at
/// `<cache_dir>/runs/<escaped_output_dir>/run.json` (§6.3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct JobRunEntry {
    pub params: RunParams,
    pub output_dir: PathBuf,
    pub size: String,
    pub fred_version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct JobModel {
    pub program: String,
    pub runs: Vec<JobRunEntry>,
    pub key: String,
    pub results_dir: PathBuf,
}

fn cache_path(config: &ClientConfig, key: &str) -> PathBuf {
    config.jobs_cache_dir().join(key).join("job.json")
}

pub(crate) fn write(config: &ClientConfig, model: &JobModel) -> Result<()> {
    let path = cache_path(config, &model.key);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(model)?;
    std::fs::write(&path, json)?;
    Ok(())
}

pub(crate) fn read(config: &ClientConfig, key: &str) -> Result<JobModel> {
    let path = cache_path(config, key);
    let content = std::fs::read(&path)?;
    serde_json::from_slice(&content).map_err(|e| ClientError::CorruptCache {
        path,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use simrun_params::PopRef;

    fn entry(output_dir: &std::path::Path) -> JobRunEntry {
        let pop = PopRef::new("US_County", vec!["42003".into()]).unwrap();
        let params = RunParams::new("model.fred", pop, None, None, None, Some(1), false).unwrap();
        JobRunEntry {
            params,
            output_dir: output_dir.to_path_buf(),
            size: "hot_small".to_string(),
            fred_version: "latest".to_string(),
        }
    }

    #[test]
    fn round_trips_through_cache_dir() {
        let cache_dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new(cache_dir.path());
        let results_dir = tempfile::tempdir().unwrap();

        let model = JobModel {
            program: "model.fred".to_string(),
            runs: vec![entry(&results_dir.path().join("my-key").join("0"))],
            key: "my-key".to_string(),
            results_dir: results_dir.path().to_path_buf(),
        };
        write(&config, &model).unwrap();

        let read_back = read(&config, "my-key").unwrap();
        assert_eq!(read_back, model);
    }

    #[test]
    fn missing_entry_is_io_error() {
        let cache_dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new(cache_dir.path());
        let err = read(&config, "no-such-key").unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn corrupt_entry_is_corrupt_cache() {
        let cache_dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new(cache_dir.path());
        let path = cache_path(&config, "my-key");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        let err = read(&config, "my-key").unwrap_err();
        assert!(matches!(err, ClientError::CorruptCache { .. }));
    }
}
