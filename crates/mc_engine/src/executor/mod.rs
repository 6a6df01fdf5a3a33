//! Executors: partitioning, dispatch, collection and cancellation.
//!
//! An [`Executor`] turns `(kernel, N)` into an [`ExecutionRecord`]. Two
//! implementations exist:
//!
//! - [`SerialExecutor`]: one worker, inline on the calling thread
//! - [`ParallelExecutor`]: `P` workers on a dedicated pool of `P` threads
//!
//! Both derive worker streams from a [`SeedSequence`](crate::rng::SeedSequence),
//! so with a fixed seed a run is reproducible for a given worker count.

mod cancel;
mod config;
mod parallel;
mod partition;
mod record;
mod serial;

pub use cancel::CancellationToken;
pub use config::{ExecutorConfig, ExecutorConfigBuilder, RemainderPolicy, MAX_WORKERS};
pub use parallel::ParallelExecutor;
pub use partition::{dropped_trials, partition};
pub use record::{ExecutionRecord, RunError};
pub use serial::SerialExecutor;

use crate::kernels::SamplingKernel;
use mc_core::types::{TrialCount, WorkerCount};
use std::any::Any;

/// Runs a sampling kernel for a number of trials.
pub trait Executor {
    /// Number of workers a run is spread over.
    fn workers(&self) -> WorkerCount;

    /// Runs `trials` trials of `kernel` and aggregates the result.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] wrapping:
    /// - `InvalidConfiguration` if the trials cannot be spread over the workers
    /// - `Cancelled` if `cancel` fires before every worker delivered
    /// - `WorkerFailure` if a worker panicked or delivered a short result
    /// - any error the kernel itself reported
    fn execute<K: SamplingKernel>(
        &self,
        kernel: &K,
        trials: TrialCount,
        cancel: &CancellationToken,
    ) -> Result<ExecutionRecord<K::Aggregate>, RunError>;
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
