//! On-disk cache record for one run (§4.8), keyed by its escaped
//! `output_dir`.
//!

use serde::{Deserialize, Serialize};
use simrun_common::{escape_output_dir, ClientConfig, ClientError, Result};
use simrun_params::RunParams;
use std::path::{Path, PathBuf};

/// The JSON shape persisted at `<cache_dir>/runs/<escaped_output_dir>/run.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct RunModel {
    pub params: RunParams,
    pub output_dir: PathBuf,
    pub size: String,
    pub fred_version: String,
}

pub(crate) fn cache_path(config: &ClientConfig, output_dir: &Path) -> PathBuf {
    config
        .runs_cache_dir()
        .join(escape_output_dir(output_dir))
        .join("run.json")
}

pub(crate) fn write(config: &ClientConfig, model: &RunModel) -> Result<()> {
    let path = cache_path(config, &model.output_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(model)?;
    std::fs::write(&path, json)?;
    Ok(())
}

pub(crate) fn read(config: &ClientConfig, output_dir: &Path) -> Result<RunModel> {
    let path = cache_path(config, output_dir);
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

    fn model(output_dir: &Path) -> RunModel {
        let pop = PopRef::new("US_County", vec!["42003".into()]).unwrap();
        let params = RunParams::new("model.fred", pop, None, None, None, Some(1), false).unwrap();
        RunModel {
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
        let output_dir = tempfile::tempdir().unwrap();

        let written = model(output_dir.path());
        write(&config, &written).unwrap();

        let read_back = read(&config, output_dir.path()).unwrap();
        assert_eq!(read_back, written);
    }

    #[test]
    fn missing_entry_is_io_error() {
        let cache_dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new(cache_dir.path());
        let err = read(&config, Path::new("/no/such/output")).unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn corrupt_entry_is_corrupt_cache() {
        let cache_dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new(cache_dir.path());
        let output_dir = tempfile::tempdir().unwrap();
        let path = cache_path(&config, output_dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        let err = read(&config, output_dir.path()).unwrap_err();
        assert!(matches!(err, ClientError::CorruptCache { .. }));
    }
}
