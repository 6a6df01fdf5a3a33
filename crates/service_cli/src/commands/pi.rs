//! Pi command implementation
//!
//! Estimates π by sampling the unit square.

use clap::Args;
use mc_engine::kernels::PiKernel;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::{execute, RunArgs};
use crate::config::CliConfig;
use crate::export::{export_to_file, write_pi_samples};
use crate::output::{render, row, Summary};
use crate::Result;

/// Dump file name inside the output directory.
pub const DUMP_FILE: &str = "pi_samples.txt";

/// Arguments of `mcsim pi`
#[derive(Args, Debug, Clone, Default)]
pub struct PiArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

/// Result of `mcsim pi`
#[derive(Debug, Clone, Serialize)]
pub struct PiSummary {
    pub workers: usize,
    pub seed: u64,
    pub trials_requested: usize,
    pub trials_executed: usize,
    pub inside: u64,
    pub estimate: f64,
    pub abs_error: f64,
    pub std_error: f64,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_file: Option<PathBuf>,
}

impl Summary for PiSummary {
    fn title(&self) -> String {
        format!("π (n = {}, p = {})", self.trials_executed, self.workers)
    }

    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            row("estimate", format!("{:.8}", self.estimate)),
            row("abs_error", format!("{:.3e}", self.abs_error)),
            row("std_error", format!("{:.3e}", self.std_error)),
            row("inside", self.inside),
            row("trials_executed", self.trials_executed),
            row("workers", self.workers),
            row("seed", self.seed),
            row("elapsed_seconds", format!("{:.6}", self.elapsed_seconds)),
        ];
        if let Some(path) = &self.dump_file {
            rows.push(row("dump_file", path.display()));
        }
        rows
    }
}

/// Run the pi command
pub fn run(args: &PiArgs, config: &CliConfig, out: &mut dyn Write) -> Result<PiSummary> {
    let kernel = PiKernel::new().with_sample_capture(args.run.dump);
    let record = execute(&kernel, &args.run, config, config.trials)?;
    info!(
        workers = record.workers.get(),
        elapsed = record.elapsed_seconds(),
        "pi estimated"
    );

    let estimate = record.aggregate();
    let dump_file = if args.run.dump {
        Some(export_to_file(&config.output_dir, DUMP_FILE, |w| {
            write_pi_samples(w, &estimate.samples)
        })?)
    } else {
        None
    };

    let summary = PiSummary {
        workers: record.workers.get(),
        seed: record.seed,
        trials_requested: record.trials_requested,
        trials_executed: record.trials_executed,
        inside: estimate.inside,
        estimate: estimate.estimate,
        abs_error: estimate.abs_error(),
        std_error: estimate.std_error(),
        elapsed_seconds: record.elapsed_seconds(),
        dump_file,
    };
    render(&summary, config.format, out)?;
    Ok(summary)
}
