//! Run results and run failures.

use mc_core::types::{Domain, SimulationError, WorkerCount};
use std::time::Duration;
use thiserror::Error;

/// Outcome of one successful run.
///
/// `elapsed` covers dispatch, sampling and collection. It excludes building
/// the kernel (fetching prices, bounding the integrand) and building the
/// worker pool.
#[derive(Clone, Debug)]
pub struct ExecutionRecord<A> {
    /// Domain of the kernel that ran.
    pub domain: Domain,
    /// Workers the trials were spread over.
    pub workers: WorkerCount,
    /// Base seed of the run's streams.
    pub seed: u64,
    /// Trials asked for.
    pub trials_requested: usize,
    /// Trials actually run (smaller than requested when remainders are dropped).
    pub trials_executed: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// Domain result.
    pub aggregate: A,
}

impl<A> ExecutionRecord<A> {
    /// Returns the domain result.
    #[inline]
    pub fn aggregate(&self) -> &A {
        &self.aggregate
    }

    /// Consumes the record, returning the domain result.
    #[inline]
    pub fn into_aggregate(self) -> A {
        self.aggregate
    }

    /// Wall-clock time in seconds.
    #[inline]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Trials run per second of wall-clock time.
    pub fn throughput(&self) -> f64 {
        self.trials_executed as f64 / self.elapsed_seconds()
    }
}

/// A failed run, tagged with what was being run.
///
/// # Examples
///
/// ```rust
/// use mc_core::types::{Domain, SimulationError};
/// use mc_engine::executor::RunError;
///
/// let err = RunError::new(Domain::Pi, 4, SimulationError::Cancelled);
/// assert_eq!(err.to_string(), "pi run with 4 worker(s) failed: Simulation cancelled");
/// assert!(err.is_cancelled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{domain} run with {workers} worker(s) failed: {source}")]
pub struct RunError {
    /// Domain of the failed run.
    pub domain: Domain,
    /// Worker count of the failed run.
    pub workers: usize,
    /// Underlying failure.
    #[source]
    pub source: SimulationError,
}

impl RunError {
    /// Tags `source` with its run.
    pub fn new(domain: Domain, workers: usize, source: SimulationError) -> Self {
        Self {
            domain,
            workers,
            source,
        }
    }

    /// Returns the underlying failure.
    #[inline]
    pub fn kind(&self) -> &SimulationError {
        &self.source
    }

    /// Returns true if the run was cancelled rather than failed.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }
}

impl From<RunError> for SimulationError {
    fn from(err: RunError) -> Self {
        err.source
    }
}
