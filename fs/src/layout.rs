//! Path Resolver (§4.5): maps a run's `output_dir` to the filesystem
//! locations of every artifact the engine can produce, per engine version.
//!

use regex::Regex;
use simrun_submit::{rescale_seed, EngineVersion};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// The flavor of `count` file requested for [`PathResolver::state_count`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountKind {
    Count,
    New,
    Cumulative,
}

/// Resolves every artifact path for one run, switching layout based on the
/// run's engine major version (Design Notes §9: "abstract base +
/// version-specialized subclasses", modeled here as one type with an
/// internal tag rather than two trait objects).
#[derive(Clone, Debug)]
pub struct PathResolver {
    output_dir: PathBuf,
    version: EngineVersion,
    seed: u64,
    run_number_override: Option<u32>,
}

impl PathResolver {
    pub fn new(output_dir: impl Into<PathBuf>, version: EngineVersion, seed: u64) -> Self {
        Self {
            output_dir: output_dir.into(),
            version,
            seed,
            run_number_override: None,
        }
    }

    /// Supply a rescaled run number directly instead of deriving it from
    /// the seed (§4.5: "used when a caller already knows the rescaled run
    /// number, e.g. for diagnostics").
    pub fn with_run_number(mut self, run_number: u32) -> Self {
        self.run_number_override = Some(run_number);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn version(&self) -> &EngineVersion {
        &self.version
    }

    fn run_number(&self) -> u32 {
        self.run_number_override
            .unwrap_or_else(|| rescale_seed(self.seed))
    }

    fn is_older(&self) -> bool {
        self.version.is_older_major()
    }

    /// The versioned `RUN<n>` subdirectory most accessors are relative to
    /// under the older layout; equal to `output_dir` under the newer one.
    /// Exposed directly per §11 (the original's `FileFinderF10.run_output_dir`).
    pub fn run_output_dir(&self) -> PathBuf {
        if self.is_older() {
            self.output_dir.join(format!("RUN{}", self.run_number()))
        } else {
            self.output_dir.clone()
        }
    }

    fn daily_dir(&self) -> PathBuf {
        self.run_output_dir().join("DAILY")
    }

    fn variables_dir(&self) -> PathBuf {
        self.output_dir.join("VARIABLES")
    }

    fn user_output_dir(&self) -> PathBuf {
        self.output_dir.join("USER_OUTPUT")
    }

    fn networks_dir(&self) -> PathBuf {
        self.output_dir.join("NETWORKS")
    }

    pub fn return_code(&self) -> PathBuf {
        self.run_output_dir().join("return_code.txt")
    }

    /// Newer major's single combined log file. `None` under the older
    /// layout (see [`Self::status_file`]/[`Self::errors_file`] instead).
    pub fn logs_file(&self) -> Option<PathBuf> {
        if self.is_older() {
            None
        } else {
            Some(self.output_dir.join("logs.txt"))
        }
    }

    /// Older major's status log. `None` under the newer layout.
    pub fn status_file(&self) -> Option<PathBuf> {
        if self.is_older() {
            Some(self.run_output_dir().join("status.txt"))
        } else {
            None
        }
    }

    /// Older major's optional FRED error log, beside `status.txt`.
    pub fn errors_file(&self) -> Option<PathBuf> {
        if self.is_older() {
            Some(self.run_output_dir().join("errors.txt"))
        } else {
            None
        }
    }

    /// The condition manifest. Present (and parseable, if the caller
    /// chooses to) under both layouts, per §11.
    pub fn conditions_json(&self) -> PathBuf {
        self.run_output_dir().join("conditions.json")
    }

    pub fn print_output(&self) -> PathBuf {
        if self.is_older() {
            self.run_output_dir().join("fred_out.txt")
        } else {
            self.user_output_dir().join("print_output.txt")
        }
    }

    pub fn user_csv(&self, name: &str) -> PathBuf {
        if self.is_older() {
            self.run_output_dir().join("CSV").join(name)
        } else {
            self.user_output_dir().join(name)
        }
    }

    pub fn user_text(&self, name: &str) -> PathBuf {
        self.user_csv(name)
    }

    pub fn state_count(&self, condition: &str, state: &str, kind: CountKind) -> PathBuf {
        let fname = match kind {
            CountKind::Count => format!("{condition}.{state}.txt"),
            CountKind::New => format!("{condition}.new{state}.txt"),
            CountKind::Cumulative => format!("{condition}.tot{state}.txt"),
        };
        self.daily_dir().join(fname)
    }

    pub fn dates(&self) -> PathBuf {
        self.daily_dir().join("Date.txt")
    }

    pub fn epi_weeks(&self) -> PathBuf {
        self.daily_dir().join("EpiWeek.txt")
    }

    pub fn pop_size(&self) -> PathBuf {
        self.daily_dir().join("Popsize.txt")
    }

    pub fn numeric_var(&self, name: &str) -> PathBuf {
        if self.is_older() {
            self.daily_dir().join(format!("FRED.{name}.txt"))
        } else {
            self.variables_dir().join(format!("numeric.{name}.csv"))
        }
    }

    pub fn list_var(&self, name: &str) -> PathBuf {
        if self.is_older() {
            self.run_output_dir().join("LIST").join(format!("{name}.txt"))
        } else {
            self.variables_dir().join(format!("list.{name}.csv"))
        }
    }

    fn list_dir_older(&self) -> PathBuf {
        self.run_output_dir().join("LIST")
    }

    pub fn list_var_by_day(&self, name: &str, day: i64) -> PathBuf {
        if self.is_older() {
            self.list_dir_older().join(format!("{name}-{day}.txt"))
        } else {
            self.variables_dir().join(format!("list.{name}-{day}.csv"))
        }
    }

    pub fn table_var_by_day(&self, name: &str, day: i64) -> PathBuf {
        if self.is_older() {
            self.list_dir_older().join(format!("{name}-{day}.txt"))
        } else {
            self.variables_dir().join(format!("table.{name}-{day}.csv"))
        }
    }

    pub fn list_table_var_by_day(&self, name: &str, day: i64) -> PathBuf {
        if self.is_older() {
            self.list_dir_older().join(format!("{name}-{day}.txt"))
        } else {
            self.variables_dir()
                .join(format!("list_table.{name}-{day}.csv"))
        }
    }

    pub fn network(&self, name: &str, day: i64) -> PathBuf {
        if self.is_older() {
            self.run_output_dir().join(format!("{name}-{day}.vna"))
        } else {
            self.networks_dir().join(format!("{name}-{day}.gv"))
        }
    }

    /// `(sim_day, path)` pairs for every "by sim-day" artifact matching
    /// `<prefix>-<integer>.<ext>` under `dir`, sorted by `sim_day`, per
    /// §4.5.
    fn by_sim_day(dir: &Path, prefix: &str, ext: &str) -> Vec<(i64, PathBuf)> {
        static DAY_RE: OnceLock<Regex> = OnceLock::new();
        let re = DAY_RE.get_or_init(|| Regex::new(r"^(.*)-(-?\d+)\.([^.]+)$").unwrap());

        let mut found = Vec::new();
        let Ok(entries) = std::fs::read_dir(dir) else {
            return found;
        };
        for entry in entries.flatten() {
            let fname = entry.file_name();
            let Some(fname) = fname.to_str() else {
                continue;
            };
            let Some(caps) = re.captures(fname) else {
                continue;
            };
            if &caps[1] != prefix || &caps[3] != ext {
                continue;
            }
            if let Ok(day) = caps[2].parse::<i64>() {
                found.push((day, entry.path()));
            }
        }
        found.sort_by_key(|(day, _)| *day);
        found
    }

    /// Every per-day list-variable artifact for `name`.
    pub fn list_var_days(&self, name: &str) -> Vec<(i64, PathBuf)> {
        if self.is_older() {
            Self::by_sim_day(&self.list_dir_older(), name, "txt")
        } else {
            Self::by_sim_day(&self.variables_dir(), &format!("list.{name}"), "csv")
        }
    }

    /// Every per-day table-variable artifact for `name`.
    pub fn table_var_days(&self, name: &str) -> Vec<(i64, PathBuf)> {
        if self.is_older() {
            Self::by_sim_day(&self.list_dir_older(), name, "txt")
        } else {
            Self::by_sim_day(&self.variables_dir(), &format!("table.{name}"), "csv")
        }
    }

    /// Every per-day list-table-variable artifact for `name`.
    pub fn list_table_var_days(&self, name: &str) -> Vec<(i64, PathBuf)> {
        if self.is_older() {
            Self::by_sim_day(&self.list_dir_older(), name, "txt")
        } else {
            Self::by_sim_day(&self.variables_dir(), &format!("list_table.{name}"), "csv")
        }
    }

    /// Every per-day snapshot of network `name`.
    pub fn network_days(&self, name: &str) -> Vec<(i64, PathBuf)> {
        if self.is_older() {
            Self::by_sim_day(&self.run_output_dir(), name, "vna")
        } else {
            Self::by_sim_day(&self.networks_dir(), name, "gv")
        }
    }
}
