//! Command-line driver for the simrun client.
//!
//! Usage:
//!
//! ```text
//! Command-line driver for submitting and inspecting simrun jobs.
//!
//! Commands:
//!   submit  Submit a job expanded from a sweep config file
//!   status  Check the aggregated status of a job or a single run
//!   list    List cached job keys
//!   delete  Delete a run's output directory
//!   help    Print this message or the help of the given subcommand(s)
//!
//! Options:
//!   -c, --cache-dir <CACHE_DIR>  Override the cache directory
//!   -D, --debug                  Debug mode
//!   -h, --help                   Print help
//! ```

mod cli;
mod commands;
mod sweep_file;

use clap::Parser;
use eyre::Result;

use simrun_common::{init_logging, ClientConfig};

use crate::cli::{Opts, SubCommand};

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logging(opts.debug);

    let config = match &opts.cache_dir {
        Some(dir) => ClientConfig::from_env().with_cache_dir(dir.clone()),
        None => ClientConfig::from_env(),
    };

    match &opts.subcmd {
        SubCommand::Submit(submit_opts) => commands::submit(config, submit_opts),
        SubCommand::Status(status_opts) => commands::status(config, status_opts),
        SubCommand::List => commands::list(config),
        SubCommand::Delete(delete_opts) => commands::delete(config, delete_opts),
    }
}
