//! Error types for structured error handling.
//!
//! Every failure inside an estimation run maps onto one [`SimulationError`]
//! variant. None of them is recoverable inside a single run: a failed worker
//! invalidates the whole run and nothing is retried.

use thiserror::Error;

/// Categorised simulation errors.
///
/// # Variants
/// - `InvalidConfiguration`: worker/trial counts that cannot form a run
/// - `InvalidParameters`: malformed kernel parameters (bounds, price series, window)
/// - `UpstreamData`: the price source failed or returned unusable data
/// - `Cancelled`: the run was aborted through its cancellation token
/// - `WorkerFailure`: a worker panicked or vanished without delivering a result
///
/// # Examples
/// ```
/// use mc_core::types::SimulationError;
///
/// let err = SimulationError::invalid_parameters("lower bound 2 >= upper bound 1");
/// assert_eq!(
///     err.to_string(),
///     "Invalid parameters: lower bound 2 >= upper bound 1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Worker or trial counts do not describe a valid run.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Kernel parameters are malformed.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The external price source failed.
    #[error("Upstream data error: {0}")]
    UpstreamData(String),

    /// The run was cancelled before every worker delivered.
    #[error("Simulation cancelled")]
    Cancelled,

    /// A worker terminated without delivering its partial result.
    #[error("Worker failure: {0}")]
    WorkerFailure(String),
}

impl SimulationError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an invalid parameters error
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Create an upstream data error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamData(msg.into())
    }

    /// Create a worker failure error
    pub fn worker_failure(msg: impl Into<String>) -> Self {
        Self::WorkerFailure(msg.into())
    }

    /// Returns `true` if this error only reports a cancellation.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
