//! Command-line surface for `simrun` (§10.5).
//!
//! Sub-commands:
//!
//! - `submit CONFIG` — expand a sweep config file into a job and submit it.
//! - `status --job KEY` / `status --run DIR` — check aggregated status.
//! - `list` — list cached job keys.
//! - `delete DIR` — remove a run's output directory.
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};

/// CLI options.
#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// Override the cache directory (defaults to `EPX_CACHE_DIR`/`~/.epx_client`).
    #[clap(short = 'c', long)]
    pub cache_dir: Option<PathBuf>,
    /// Debug mode: enable hierarchical span tracing output.
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Submit a job expanded from a sweep config file.
    Submit(SubmitOpts),
    /// Check the aggregated status of a job or a single run.
    Status(StatusOpts),
    /// List cached job keys.
    List,
    /// Delete a run's output directory.
    Delete(DeleteOpts),
}

#[derive(Debug, Parser)]
pub struct SubmitOpts {
    /// Path to a JSON sweep config file.
    pub config: PathBuf,
    /// Maximum number of runs submitted concurrently.
    #[clap(long, default_value_t = simrun_job::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

#[derive(Debug, Parser)]
pub struct StatusOpts {
    /// Check a cached job by key.
    #[clap(long, conflicts_with = "run")]
    pub job: Option<String>,
    /// Check a single run by its output directory.
    #[clap(long, conflicts_with = "job")]
    pub run: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct DeleteOpts {
    /// The run's output directory to remove.
    pub output_dir: PathBuf,
    /// Skip the confirmation prompt.
    #[clap(long)]
    pub yes: bool,
}
