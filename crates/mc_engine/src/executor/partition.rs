//! Splitting a run's trials between workers.

use super::config::RemainderPolicy;
use mc_core::types::{SimulationError, TrialCount, WorkerCount};

/// Per-worker trial counts for a run of `trials` over `workers`.
///
/// # Errors
///
/// Returns `SimulationError::InvalidConfiguration` if there are more workers
/// than trials, since some worker would have nothing to run.
///
/// # Examples
///
/// ```rust
/// use mc_core::types::{TrialCount, WorkerCount};
/// use mc_engine::executor::{partition, RemainderPolicy};
///
/// let trials = TrialCount::new(10).unwrap();
/// let workers = WorkerCount::new(3).unwrap();
///
/// assert_eq!(partition(trials, workers, RemainderPolicy::Distribute).unwrap(), vec![4, 3, 3]);
/// assert_eq!(partition(trials, workers, RemainderPolicy::Drop).unwrap(), vec![3, 3, 3]);
/// ```
pub fn partition(
    trials: TrialCount,
    workers: WorkerCount,
    policy: RemainderPolicy,
) -> Result<Vec<usize>, SimulationError> {
    workers.validate_against(trials)?;

    let (n, p) = (trials.get(), workers.get());
    let share = n / p;
    let remainder = n % p;
    Ok((0..p)
        .map(|slot| match policy {
            RemainderPolicy::Drop => share,
            RemainderPolicy::Distribute => share + usize::from(slot < remainder),
        })
        .collect())
}

/// Number of requested trials that `policy` leaves unrun.
pub fn dropped_trials(trials: TrialCount, workers: WorkerCount, policy: RemainderPolicy) -> usize {
    match policy {
        RemainderPolicy::Drop => trials.get() % workers.get(),
        RemainderPolicy::Distribute => 0,
    }
}
