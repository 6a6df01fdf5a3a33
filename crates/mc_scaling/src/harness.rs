//! The scaling sweep driver.

use crate::config::{FailurePolicy, ScalingConfig, ScalingMode};
use crate::error::ScalingError;
use crate::report::{ScalingRecord, ScalingReport, SweepFailure};
use mc_core::types::{TrialCount, WorkerCount};
use mc_engine::executor::{
    CancellationToken, ExecutionRecord, Executor, ParallelExecutor, RunError, SerialExecutor,
};
use mc_engine::kernels::SamplingKernel;

/// Runs a kernel serially and in parallel over a sweep of worker counts.
///
/// Runs are strictly sequential: only one run occupies the machine at a
/// time, and the report is only touched by the calling thread.
#[derive(Clone, Debug)]
pub struct ScalingHarness {
    config: ScalingConfig,
}

/// Outcome of one worker count.
enum Step {
    Record(ScalingRecord),
    Failed(RunError),
}

impl ScalingHarness {
    /// Creates a harness for `config`.
    pub fn new(config: ScalingConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ScalingConfig {
        &self.config
    }

    /// Sweeps `kernel` over the configured worker counts.
    ///
    /// # Errors
    ///
    /// - `ScalingError::Run` if a run fails under `FailurePolicy::Abort`, if
    ///   the strong-scaling baseline fails, or if the sweep is cancelled
    /// - `ScalingError::InvalidSweep` if a weak-scaling trial count overflows
    pub fn run<K: SamplingKernel>(
        &self,
        kernel: &K,
        cancel: &CancellationToken,
    ) -> Result<ScalingReport, ScalingError> {
        let config = &self.config;
        let serial = SerialExecutor::new(config.executor().clone());
        tracing::info!(
            mode = ?config.mode(),
            law = %config.law(),
            base_trials = config.base_trials().get(),
            workers = ?config.worker_counts(),
            "scaling sweep started"
        );

        let baseline = match config.mode() {
            ScalingMode::Strong => Some(serial.execute(kernel, config.base_trials(), cancel)?),
            ScalingMode::Weak => None,
        };

        let mut report = ScalingReport {
            mode: config.mode(),
            law: config.law(),
            serial_fraction: config.serial_fraction(),
            records: Vec::new(),
            failures: Vec::new(),
        };

        for workers in config.worker_counts() {
            let worker_count = WorkerCount::new(workers)?;
            let step = match &baseline {
                Some(baseline) => self.parallel_step(kernel, baseline, worker_count, cancel)?,
                None => {
                    let trials = config.base_trials().scaled_by(worker_count)?;
                    match serial.execute(kernel, trials, cancel) {
                        Ok(serial_run) => {
                            self.parallel_step(kernel, &serial_run, worker_count, cancel)?
                        }
                        Err(err) => Step::Failed(err),
                    }
                }
            };

            match step {
                Step::Record(record) => {
                    tracing::info!(
                        workers = record.workers,
                        trials = record.trials,
                        achieved = record.achieved_speedup,
                        theoretical = record.theoretical_speedup,
                        "scaling row"
                    );
                    report.records.push(record);
                }
                Step::Failed(err) => {
                    if err.is_cancelled() || config.failure_policy() == FailurePolicy::Abort {
                        return Err(err.into());
                    }
                    tracing::warn!(workers, error = %err, "run failed, sweep continues");
                    report.failures.push(SweepFailure {
                        workers,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Runs the parallel side of one worker count against a serial run of
    /// the same size.
    fn parallel_step<K: SamplingKernel>(
        &self,
        kernel: &K,
        serial_run: &ExecutionRecord<K::Aggregate>,
        workers: WorkerCount,
        cancel: &CancellationToken,
    ) -> Result<Step, ScalingError> {
        let executor = ParallelExecutor::new(self.config.executor().clone(), workers)?;
        let trials = TrialCount::new(serial_run.trials_requested)?;

        Ok(match executor.execute(kernel, trials, cancel) {
            Ok(parallel_run) => Step::Record(ScalingRecord::new(
                workers.get(),
                trials.get(),
                serial_run.elapsed_seconds(),
                parallel_run.elapsed_seconds(),
                self.config
                    .law()
                    .speedup(workers.get(), self.config.serial_fraction()),
            )),
            Err(err) => Step::Failed(err),
        })
    }
}
