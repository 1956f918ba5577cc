//! Sub-command handlers, mirroring the teacher's `handle_subcmd` dispatch
//! in shape (one function per sub-command, returning `eyre::Result`).
//!

use std::io::Write;

use eyre::{eyre, Result};
use tracing::info;

use simrun_common::ClientConfig;
use simrun_job::Job;
use simrun_run::Run;
use simrun_submit::EngineVersion;

use crate::cli::{DeleteOpts, StatusOpts, SubmitOpts};
use crate::sweep_file::SweepFile;

#[tracing::instrument(skip(config))]
pub fn submit(config: ClientConfig, opts: &SubmitOpts) -> Result<()> {
    let sweep_file = SweepFile::load(&opts.config)?;
    let key = sweep_file.key.clone();
    let results_dir = sweep_file.results_dir.clone();
    let size = sweep_file.size.clone();
    let engine_version = EngineVersion::parse(sweep_file.engine_version.clone())?;
    let sweep = sweep_file.into_sweep()?;

    let job = Job::new(config, sweep.into(), key.clone(), results_dir, size, engine_version)?
        .with_concurrency(opts.concurrency);

    info!(n_runs = job.runs().len(), key = %key, "submitting job");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(job.execute())?;

    println!("submitted job {key} ({} runs)", job.runs().len());
    Ok(())
}

pub fn status(config: ClientConfig, opts: &StatusOpts) -> Result<()> {
    if let Some(key) = &opts.job {
        let job = Job::from_key(config, key)?;
        println!("job {key}: {}", job.status());
        for row in job.run_meta() {
            println!(
                "  run {:>3} seed={:<10} status={}",
                row.run_id,
                row.seed,
                job.runs()[row.run_id as usize].status()
            );
        }
        return Ok(());
    }

    if let Some(output_dir) = &opts.run {
        let run = Run::from_output_dir(config, output_dir)?;
        println!("{run}");
        return Ok(());
    }

    Err(eyre!("specify either --job KEY or --run DIR"))
}

pub fn list(config: ClientConfig) -> Result<()> {
    let dir = config.jobs_cache_dir();
    if !dir.exists() {
        return Ok(());
    }
    let mut keys: Vec<String> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    keys.sort();
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

pub fn delete(config: ClientConfig, opts: &DeleteOpts) -> Result<()> {
    if !opts.yes {
        print!("delete all data under {}? [y/N] ", opts.output_dir.display());
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("aborted");
            return Ok(());
        }
    }

    match Run::from_output_dir(config, &opts.output_dir) {
        Ok(run) => run.delete(false)?,
        Err(_) => {
            if opts.output_dir.exists() {
                std::fs::remove_dir_all(&opts.output_dir)?;
            }
        }
    }
    println!("deleted {}", opts.output_dir.display());
    Ok(())
}
