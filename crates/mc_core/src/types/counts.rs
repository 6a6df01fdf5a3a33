//! Validated trial and worker counts.
//!
//! Both counts are positive integers fixed by the caller before a run starts.
//! A worker count is only meaningful relative to a trial count: a run with
//! more workers than trials is rejected as an invalid configuration.

use super::error::SimulationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total number of independent trials requested for one estimation run.
///
/// # Examples
///
/// ```rust
/// use mc_core::types::TrialCount;
///
/// let trials = TrialCount::new(10_000_000).unwrap();
/// assert_eq!(trials.get(), 10_000_000);
/// assert!(TrialCount::new(0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TrialCount(usize);

impl TrialCount {
    /// Creates a trial count.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if `trials` is zero.
    pub fn new(trials: usize) -> Result<Self, SimulationError> {
        if trials == 0 {
            return Err(SimulationError::invalid_configuration(
                "trial count must be positive",
            ));
        }
        Ok(Self(trials))
    }

    /// Returns the raw count.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Scales the count by a worker count, as a weak scaling sweep does.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` on overflow.
    pub fn scaled_by(self, workers: WorkerCount) -> Result<Self, SimulationError> {
        self.0
            .checked_mul(workers.get())
            .map(Self)
            .ok_or_else(|| {
                SimulationError::invalid_configuration(format!(
                    "{} trials x {} workers overflows",
                    self.0, workers
                ))
            })
    }
}

impl TryFrom<usize> for TrialCount {
    type Error = SimulationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrialCount> for usize {
    fn from(value: TrialCount) -> Self {
        value.0
    }
}

impl fmt::Display for TrialCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Degree of parallelism for one estimation run.
///
/// # Examples
///
/// ```rust
/// use mc_core::types::{TrialCount, WorkerCount};
///
/// let workers = WorkerCount::new(4).unwrap();
/// assert!(workers.validate_against(TrialCount::new(4).unwrap()).is_ok());
/// assert!(workers.validate_against(TrialCount::new(3).unwrap()).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct WorkerCount(usize);

impl WorkerCount {
    /// A single worker, as used by the serial executor.
    pub const ONE: WorkerCount = WorkerCount(1);

    /// Creates a worker count.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if `workers` is zero.
    pub fn new(workers: usize) -> Result<Self, SimulationError> {
        if workers == 0 {
            return Err(SimulationError::invalid_configuration(
                "worker count must be positive",
            ));
        }
        Ok(Self(workers))
    }

    /// Returns the raw count.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Checks that every worker can be assigned at least one trial.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if there are more
    /// workers than trials.
    pub fn validate_against(self, trials: TrialCount) -> Result<(), SimulationError> {
        if self.0 > trials.get() {
            return Err(SimulationError::invalid_configuration(format!(
                "{} workers exceed {} trials",
                self.0, trials
            )));
        }
        Ok(())
    }
}

impl TryFrom<usize> for WorkerCount {
    type Error = SimulationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkerCount> for usize {
    fn from(value: WorkerCount) -> Self {
        value.0
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
