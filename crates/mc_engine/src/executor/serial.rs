//! Single-worker execution on the calling thread.

use super::{
    panic_message, CancellationToken, ExecutionRecord, Executor, ExecutorConfig, RunError,
};
use crate::kernels::{Mergeable, SamplingKernel};
use crate::rng::SeedSequence;
use mc_core::types::{SimulationError, TrialCount, WorkerCount};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Runs every trial inline on the calling thread with the slot-0 stream.
///
/// With the same seed a serial run draws exactly what a one-worker
/// [`ParallelExecutor`](super::ParallelExecutor) run draws, and serves as the
/// baseline for speedup measurements.
#[derive(Clone, Debug, Default)]
pub struct SerialExecutor {
    config: ExecutorConfig,
}

impl SerialExecutor {
    /// Creates a serial executor.
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl Executor for SerialExecutor {
    fn workers(&self) -> WorkerCount {
        WorkerCount::ONE
    }

    fn execute<K: SamplingKernel>(
        &self,
        kernel: &K,
        trials: TrialCount,
        cancel: &CancellationToken,
    ) -> Result<ExecutionRecord<K::Aggregate>, RunError> {
        let domain = kernel.domain();
        let fail = |source| RunError::new(domain, 1, source);

        let span = tracing::info_span!(
            "mc_run",
            domain = %domain,
            workers = 1usize,
            trials = trials.get()
        );
        let _guard = span.enter();

        let seeds = SeedSequence::from_optional(self.config.seed());
        let mut stream = seeds.stream_for(0, self.config.normal_method());
        tracing::debug!(slot = 0usize, seed = stream.seed(), "worker dispatched");

        let start = Instant::now();
        let partial = panic::catch_unwind(AssertUnwindSafe(|| {
            kernel.sample(trials.get(), &mut stream, cancel)
        }))
        .unwrap_or_else(|payload| {
            Err(SimulationError::worker_failure(format!(
                "serial worker panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
        .map_err(|error| {
            tracing::warn!(%error, "run failed");
            fail(error)
        })?;
        let elapsed = start.elapsed();

        if partial.trials() != trials.get() {
            return Err(fail(SimulationError::worker_failure(format!(
                "serial worker delivered {} of {} trials",
                partial.trials(),
                trials.get()
            ))));
        }

        let trials_executed = partial.trials();
        tracing::info!(
            trials_executed,
            seed = seeds.base(),
            elapsed_secs = elapsed.as_secs_f64(),
            "run completed"
        );
        Ok(ExecutionRecord {
            domain,
            workers: WorkerCount::ONE,
            seed: seeds.base(),
            trials_requested: trials.get(),
            trials_executed,
            elapsed,
            aggregate: kernel.finalize(partial),
        })
    }
}
