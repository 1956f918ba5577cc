//! Wire shapes for the remote submission protocol (§6.2) and the argument
//! list builder.
//!

use crate::version::EngineVersion;
use serde::{Deserialize, Serialize};
use simrun_params::RunParams;
use std::path::Path;

/// One `fredArgs` entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FredArg {
    pub flag: String,
    pub value: String,
}

impl FredArg {
    fn new(flag: &str, value: impl Into<String>) -> Self {
        Self {
            flag: flag.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationWire {
    pub version: String,
    pub locations: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(rename = "workingDir")]
    pub working_dir: String,
    pub size: String,
    #[serde(rename = "fredVersion")]
    pub fred_version: String,
    pub population: PopulationWire,
    #[serde(rename = "fredArgs")]
    pub fred_args: Vec<FredArg>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "runRequests")]
    pub run_requests: Vec<RunRequest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RunErrorWire {
    pub key: String,
    pub error: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RunResponseWire {
    #[serde(rename = "runId")]
    pub run_id: u64,
    pub status: String,
    #[serde(default)]
    pub errors: Option<Vec<RunErrorWire>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SubmitResponseWire {
    #[serde(rename = "runResponses")]
    pub run_responses: Vec<RunResponseWire>,
}

/// Build the `fredArgs` list for one run, in the normative order of §6.2.
///
/// `params` is expected to already be version-adapted (see
/// [`crate::version::adapt`]): its `seed` field carries the rescaled value
/// for an older major.
pub fn build_fred_args(
    params: &RunParams,
    output_dir: &Path,
    version: &EngineVersion,
) -> Vec<FredArg> {
    let mut args = Vec::new();

    args.push(FredArg::new("-p", params.program.clone()));
    args.push(FredArg::new("-d", output_dir.to_string_lossy().to_string()));

    if let Some(mp) = &params.model_params {
        for (k, v) in mp.iter() {
            args.push(FredArg::new("-o", format!("{k}={v}")));
        }
    }

    if version.is_older_major() {
        args.push(FredArg::new("-r", params.seed.to_string()));
    } else {
        args.push(FredArg::new("-s", params.seed.to_string()));
    }

    if let Some(sd) = &params.start_date {
        args.push(FredArg::new("--start-date", sd.wire_format()));
    }
    if let Some(ed) = &params.end_date {
        args.push(FredArg::new("--end-date", ed.wire_format()));
    }

    if !version.is_older_major() {
        for loc in &params.pop.locations {
            args.push(FredArg::new("-l", loc.clone()));
        }
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use simrun_params::PopRef;
    use std::path::PathBuf;

    fn params(seed: u64) -> RunParams {
        let pop = PopRef::new("US_County", vec!["42003".into(), "42091".into()]).unwrap();
        RunParams::new("model.fred", pop, None, None, None, Some(seed), false).unwrap()
    }

    #[test]
    fn older_major_uses_r_flag_and_no_locations() {
        let version = EngineVersion::parse("10.1.1").unwrap();
        let adapted = crate::version::adapt(&params(42), &version);
        let args = build_fred_args(&adapted, &PathBuf::from("/out/0"), &version);

        assert!(args.iter().any(|a| a.flag == "-r"));
        assert!(args.iter().all(|a| a.flag != "-s"));
        assert!(args.iter().all(|a| a.flag != "-l"));
    }

    #[test]
    fn newer_major_uses_s_flag_and_one_l_per_location() {
        let version = EngineVersion::parse("11.0.1").unwrap();
        let adapted = crate::version::adapt(&params(42), &version);
        let args = build_fred_args(&adapted, &PathBuf::from("/out/0"), &version);

        let seed_arg = args.iter().find(|a| a.flag == "-s").unwrap();
        assert_eq!(seed_arg.value, "42");
        assert!(args.iter().all(|a| a.flag != "-r"));

        let locs: Vec<_> = args.iter().filter(|a| a.flag == "-l").collect();
        assert_eq!(locs.len(), 2);
        assert_eq!(locs[0].value, "42003");
        assert_eq!(locs[1].value, "42091");
    }
}
