//! Multi-worker execution on a dedicated thread pool.

use super::{
    dropped_trials, panic_message, partition, CancellationToken, ExecutionRecord, Executor,
    ExecutorConfig, RunError,
};
use crate::kernels::{reduce, Mergeable, SamplingKernel};
use crate::rng::SeedSequence;
use crossbeam_channel::Receiver;
use mc_core::types::{SimulationError, TrialCount, WorkerCount};
use rayon::ThreadPoolBuilder;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Spreads a run over `P` workers, each on its own pool thread.
///
/// Per run:
/// 1. Partition the trials and build a pool of exactly `P` threads.
/// 2. Start the clock and spawn one task per worker slot. Slot `i` samples
///    its share with the stream seeded for slot `i`.
/// 3. Receive exactly `P` messages from a bounded channel. The first failure
///    cancels the run's siblings.
/// 4. Stop the clock, reduce the partials and finalize.
///
/// A worker that panics is reported as `SimulationError::WorkerFailure`.
///
/// # Examples
///
/// ```rust
/// use mc_core::types::{TrialCount, WorkerCount};
/// use mc_engine::executor::{CancellationToken, Executor, ExecutorConfig, ParallelExecutor};
/// use mc_engine::kernels::PiKernel;
///
/// let executor = ParallelExecutor::new(
///     ExecutorConfig::builder().seed(1).build().unwrap(),
///     WorkerCount::new(3).unwrap(),
/// )
/// .unwrap();
///
/// let record = executor
///     .execute(&PiKernel::new(), TrialCount::new(10).unwrap(), &CancellationToken::new())
///     .unwrap();
/// assert_eq!(record.trials_executed, 10);
///
/// // Fewer trials than workers cannot be partitioned.
/// let err = executor
///     .execute(&PiKernel::new(), TrialCount::new(2).unwrap(), &CancellationToken::new())
///     .unwrap_err();
/// assert_eq!(err.workers, 3);
/// ```
#[derive(Clone, Debug)]
pub struct ParallelExecutor {
    config: ExecutorConfig,
    workers: WorkerCount,
}

type WorkerMessage<P> = (usize, Result<P, SimulationError>);

impl ParallelExecutor {
    /// Creates an executor for `workers` workers.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if `workers` exceeds
    /// the configured worker cap.
    pub fn new(config: ExecutorConfig, workers: WorkerCount) -> Result<Self, SimulationError> {
        if workers.get() > config.max_workers() {
            return Err(SimulationError::invalid_configuration(format!(
                "{} workers exceed the cap of {}",
                workers,
                config.max_workers()
            )));
        }
        Ok(Self { config, workers })
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl Executor for ParallelExecutor {
    fn workers(&self) -> WorkerCount {
        self.workers
    }

    fn execute<K: SamplingKernel>(
        &self,
        kernel: &K,
        trials: TrialCount,
        cancel: &CancellationToken,
    ) -> Result<ExecutionRecord<K::Aggregate>, RunError> {
        let domain = kernel.domain();
        let worker_count = self.workers.get();
        let fail = |source| RunError::new(domain, worker_count, source);

        let shares = partition(trials, self.workers, self.config.remainder()).map_err(fail)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|index| format!("mc-worker-{}", index))
            .build()
            .map_err(|e| {
                fail(SimulationError::worker_failure(format!(
                    "cannot start {} worker threads: {}",
                    worker_count, e
                )))
            })?;

        let span = tracing::info_span!(
            "mc_run",
            domain = %domain,
            workers = worker_count,
            trials = trials.get()
        );
        let _guard = span.enter();

        let dropped = dropped_trials(trials, self.workers, self.config.remainder());
        if dropped > 0 {
            tracing::warn!(dropped, "remainder trials dropped");
        }

        let seeds = SeedSequence::from_optional(self.config.seed());
        let normal_method = self.config.normal_method();
        let run_cancel = cancel.child_token();

        let start = Instant::now();
        let collected = pool.in_place_scope(|scope| {
            let (sender, receiver) = crossbeam_channel::bounded(worker_count);
            for (slot, &share) in shares.iter().enumerate() {
                let sender = sender.clone();
                let run_cancel = &run_cancel;
                let mut stream = seeds.stream_for(slot as u64, normal_method);
                tracing::debug!(slot, share, seed = stream.seed(), "worker dispatched");
                scope.spawn(move |_| {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        kernel.sample(share, &mut stream, run_cancel)
                    }))
                    .unwrap_or_else(|payload| {
                        Err(SimulationError::worker_failure(format!(
                            "worker {} panicked: {}",
                            slot,
                            panic_message(payload.as_ref())
                        )))
                    });
                    if result.is_err() {
                        run_cancel.cancel();
                    }
                    // The receiver outlives every task; a failed send cannot happen.
                    let _ = sender.send((slot, result));
                });
            }
            drop(sender);
            collect(&receiver, &shares, &run_cancel)
        });
        let elapsed = start.elapsed();

        let partials = collected.map_err(|error| {
            tracing::warn!(%error, "run failed");
            fail(error)
        })?;
        let total = reduce(partials);
        let trials_executed = total.trials();
        tracing::info!(
            trials_executed,
            seed = seeds.base(),
            elapsed_secs = elapsed.as_secs_f64(),
            "run completed"
        );

        Ok(ExecutionRecord {
            domain,
            workers: self.workers,
            seed: seeds.base(),
            trials_requested: trials.get(),
            trials_executed,
            elapsed,
            aggregate: kernel.finalize(total),
        })
    }
}

/// Receives one message per worker slot.
///
/// Real failures take precedence over the `Cancelled` errors they cause in
/// sibling workers.
fn collect<P: Mergeable>(
    receiver: &Receiver<WorkerMessage<P>>,
    shares: &[usize],
    run_cancel: &CancellationToken,
) -> Result<Vec<P>, SimulationError> {
    let mut partials = Vec::with_capacity(shares.len());
    let mut failure: Option<SimulationError> = None;

    for _ in 0..shares.len() {
        let (slot, result) = match receiver.recv() {
            Ok(message) => message,
            Err(_) => {
                run_cancel.cancel();
                return Err(failure.unwrap_or_else(|| {
                    SimulationError::worker_failure("a worker exited without delivering a result")
                }));
            }
        };

        let error = match result {
            Ok(partial) if partial.trials() == shares[slot] => {
                partials.push(partial);
                continue;
            }
            Ok(partial) => SimulationError::worker_failure(format!(
                "worker {} delivered {} of {} trials",
                slot,
                partial.trials(),
                shares[slot]
            )),
            Err(error) => error,
        };

        run_cancel.cancel();
        tracing::debug!(slot, %error, "worker failed");
        failure = match failure {
            Some(existing) if !(existing.is_cancelled() && !error.is_cancelled()) => Some(existing),
            _ => Some(error),
        };
    }

    match failure {
        Some(error) => Err(error),
        None => Ok(partials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{IntegralKernel, PiKernel};

    fn executor(seed: u64, workers: usize) -> ParallelExecutor {
        ParallelExecutor::new(
            ExecutorConfig::builder().seed(seed).build().unwrap(),
            WorkerCount::new(workers).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_worker_cap_enforced() {
        let config = ExecutorConfig::builder().max_workers(2).build().unwrap();
        let err = ParallelExecutor::new(config, WorkerCount::new(3).unwrap()).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_parallel_reproducible_with_seed() {
        let trials = TrialCount::new(200_000).unwrap();
        let cancel = CancellationToken::new();
        let a = executor(42, 4).execute(&PiKernel::new(), trials, &cancel).unwrap();
        let b = executor(42, 4).execute(&PiKernel::new(), trials, &cancel).unwrap();
        assert_eq!(a.aggregate().inside, b.aggregate().inside);
        assert_eq!(a.seed, 42);
    }

    #[test]
    fn test_single_worker_matches_serial() {
        use crate::executor::SerialExecutor;

        let trials = TrialCount::new(100_000).unwrap();
        let cancel = CancellationToken::new();
        let kernel = IntegralKernel::new(|x: f64| x * x, 0.0, 1.0).unwrap();

        let parallel = executor(9, 1).execute(&kernel, trials, &cancel).unwrap();
        let serial = SerialExecutor::new(ExecutorConfig::builder().seed(9).build().unwrap())
            .execute(&kernel, trials, &cancel)
            .unwrap();
        assert_eq!(parallel.aggregate().below, serial.aggregate().below);
    }

    #[test]
    fn test_remainder_distributed_and_dropped() {
        use crate::executor::RemainderPolicy;

        let trials = TrialCount::new(1_003).unwrap();
        let cancel = CancellationToken::new();
        let distributed = executor(3, 4).execute(&PiKernel::new(), trials, &cancel).unwrap();
        assert_eq!(distributed.trials_executed, 1_003);

        let dropping = ParallelExecutor::new(
            ExecutorConfig::builder()
                .seed(3)
                .remainder(RemainderPolicy::Drop)
                .build()
                .unwrap(),
            WorkerCount::new(4).unwrap(),
        )
        .unwrap();
        let dropped = dropping.execute(&PiKernel::new(), trials, &cancel).unwrap();
        assert_eq!(dropped.trials_requested, 1_003);
        assert_eq!(dropped.trials_executed, 1_000);
        assert_eq!(dropped.aggregate().trials, 1_000);
    }

    #[test]
    fn test_real_failure_preferred_over_cancellation() {
        let (sender, receiver) = crossbeam_channel::bounded(3);
        sender
            .send((0usize, Err(SimulationError::Cancelled)))
            .unwrap();
        sender
            .send((1, Err(SimulationError::worker_failure("worker 1 panicked: boom"))))
            .unwrap();
        sender.send((2, Err(SimulationError::Cancelled))).unwrap();

        let cancel = CancellationToken::new();
        let result: Result<Vec<crate::kernels::PiPartial>, _> =
            collect(&receiver, &[1, 1, 1], &cancel);
        assert!(matches!(result, Err(SimulationError::WorkerFailure(_))));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_short_partial_is_worker_failure() {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        sender
            .send((
                0usize,
                Ok(crate::kernels::PiPartial {
                    trials: 4,
                    inside: 3,
                    samples: Vec::new(),
                }),
            ))
            .unwrap();

        let result = collect(&receiver, &[5], &CancellationToken::new());
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Worker failure: worker 0 delivered 4 of 5 trials"
        );
    }
}
