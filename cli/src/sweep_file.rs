//! On-disk sweep configuration (§10.5): the file format accepted by
//! `simrun submit`.
//!
//! JSON rather than the teacher's `hcl` dialect: a sweep config describes
//! run parameters, not site credentials, and the parameter types (dates,
//! model params) already round-trip through `serde_json` elsewhere in this
//! client (see DESIGN.md).
//!

use serde::Deserialize;
use simrun_common::Result;
use simrun_params::{Axis, ConfigSweep, DateInput, ModelParams, ParamValue, PopRef, SeedSpec};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct SweepFile {
    pub program: String,
    pub pop_name: String,
    pub locations: Vec<String>,
    #[serde(default)]
    pub start_dates: Vec<String>,
    #[serde(default)]
    pub end_dates: Vec<String>,
    #[serde(default)]
    pub model_params: Vec<(String, f64)>,
    #[serde(default = "default_n_reps")]
    pub n_reps: u32,
    pub seed: Option<u64>,
    #[serde(default)]
    pub seeds: Vec<u64>,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_engine_version")]
    pub engine_version: String,
    pub key: String,
    pub results_dir: PathBuf,
}

fn default_n_reps() -> u32 {
    1
}

fn default_size() -> String {
    "hot_small".to_string()
}

fn default_engine_version() -> String {
    "latest".to_string()
}

impl SweepFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn into_sweep(self) -> Result<ConfigSweep> {
        let pop = PopRef::new(self.pop_name, self.locations)?;

        let start_date = axis_of_dates(self.start_dates);
        let end_date = axis_of_dates(self.end_dates);

        let model_params = if self.model_params.is_empty() {
            Axis::One(None)
        } else {
            let entries = self
                .model_params
                .into_iter()
                .map(|(k, v)| (k, ParamValue::from(v)))
                .collect();
            Axis::One(Some(ModelParams::new(entries)))
        };

        let seed = if !self.seeds.is_empty() {
            SeedSpec::Many(self.seeds)
        } else if let Some(s) = self.seed {
            SeedSpec::Single(s)
        } else {
            SeedSpec::Absent
        };

        Ok(ConfigSweep::new(self.program, Axis::One(pop))
            .with_start_date(start_date)
            .with_end_date(end_date)
            .with_model_params(model_params)
            .with_n_reps(self.n_reps)
            .with_seed(seed))
    }
}

fn axis_of_dates(dates: Vec<String>) -> Axis<Option<DateInput>> {
    if dates.is_empty() {
        Axis::One(None)
    } else if dates.len() == 1 {
        Axis::One(Some(DateInput::from(dates[0].as_str())))
    } else {
        Axis::Many(dates.into_iter().map(|d| Some(DateInput::from(d.as_str()))).collect())
    }
}
