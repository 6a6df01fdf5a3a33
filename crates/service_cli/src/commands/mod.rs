//! CLI command implementations
//!
//! Each submodule implements one `mcsim` command. Commands take their parsed
//! arguments and the effective configuration, write their summary to the
//! given writer, and return it.

pub mod check;
pub mod finance;
pub mod integral;
pub mod pi;
pub mod scale;

use clap::Args;
use mc_core::types::{TrialCount, WorkerCount};
use mc_engine::executor::{
    CancellationToken, ExecutionRecord, Executor, ExecutorConfig, ParallelExecutor,
    SerialExecutor,
};
use mc_engine::kernels::SamplingKernel;

use crate::config::CliConfig;
use crate::Result;

/// Run-size flags shared by the estimation commands.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Number of trials (defaults to the configured trial count)
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// Number of workers (defaults to the configured worker count)
    #[arg(short = 'p', long)]
    pub workers: Option<usize>,

    /// Run every trial inline on one worker
    #[arg(long, conflicts_with = "workers")]
    pub serial: bool,

    /// Write every sample to a dump file in the output directory
    #[arg(long)]
    pub dump: bool,
}

/// Builds the executor configuration from the effective configuration.
pub fn executor_config(config: &CliConfig) -> Result<ExecutorConfig> {
    Ok(ExecutorConfig::builder()
        .maybe_seed(config.seed)
        .remainder(config.remainder)
        .normal_method(config.normal_method)
        .build()?)
}

/// Runs `kernel` serially or in parallel as `run` asks.
pub(crate) fn execute<K: SamplingKernel>(
    kernel: &K,
    run: &RunArgs,
    config: &CliConfig,
    default_trials: usize,
) -> Result<ExecutionRecord<K::Aggregate>> {
    let trials = TrialCount::new(run.trials.unwrap_or(default_trials))?;
    let executor_config = executor_config(config)?;
    let cancel = CancellationToken::new();

    let record = if run.serial {
        SerialExecutor::new(executor_config).execute(kernel, trials, &cancel)?
    } else {
        let workers = WorkerCount::new(run.workers.unwrap_or(config.workers))?;
        ParallelExecutor::new(executor_config, workers)?.execute(kernel, trials, &cancel)?
    };
    Ok(record)
}
