//! Domain sampling kernels.
//!
//! A kernel maps `(trial count, parameters, random stream)` to a partial
//! result. Kernels hold only read-only parameters, so one kernel value is
//! shared by reference between all workers of a run.
//!
//! # Reduction
//!
//! Partial results form a commutative monoid under [`Mergeable::merge`] with
//! `Default` as identity: inside-counts and below-counts add, path lists
//! concatenate. Parallel and serial runs therefore agree in expectation no
//! matter in which order workers deliver.
//!
//! # Kernels
//!
//! | Kernel | Partial | Aggregate |
//! |--------|---------|-----------|
//! | [`PiKernel`] | [`PiPartial`] | [`PiEstimate`] |
//! | [`IntegralKernel`] | [`IntegralPartial`] | [`IntegralEstimate`] |
//! | [`PricePathKernel`] | [`PricePathPartial`] | [`PricePathForecast`] |

mod integral;
mod pi;
mod price_path;

pub use integral::{
    grid_maximum, IntegralEstimate, IntegralKernel, IntegralPartial, DEFAULT_GRID_STEP,
    MAX_GRID_POINTS,
};
pub use pi::{PiEstimate, PiKernel, PiPartial};
pub use price_path::{log_returns, PricePathForecast, PricePathKernel, PricePathPartial, ReturnStatistics};

use crate::executor::CancellationToken;
use crate::rng::RandomStream;
use mc_core::types::{Domain, SimulationError};

/// Number of trials between two cancellation checks inside a kernel loop.
pub const CANCEL_CHECK_INTERVAL: usize = 1 << 16;

/// A point drawn by a kernel, kept when sample capture is enabled.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplePoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Partial result of one worker.
pub trait Mergeable: Default + Send + Sized {
    /// Combines two partial results. Must be associative and commutative.
    fn merge(self, other: Self) -> Self;

    /// Number of trials this partial result accounts for.
    fn trials(&self) -> usize;
}

/// A Monte Carlo sampling kernel for one estimation domain.
pub trait SamplingKernel: Sync {
    /// Per-worker accumulator.
    type Partial: Mergeable;

    /// Final result of a run.
    type Aggregate: Send;

    /// The domain this kernel estimates.
    fn domain(&self) -> Domain;

    /// Runs `trials` independent trials against `stream`.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::Cancelled` if `cancel` fires while sampling.
    /// Kernels may return other variants for failures detected while sampling.
    fn sample(
        &self,
        trials: usize,
        stream: &mut RandomStream,
        cancel: &CancellationToken,
    ) -> Result<Self::Partial, SimulationError>;

    /// Turns the reduced partial result of all workers into the run's answer.
    fn finalize(&self, total: Self::Partial) -> Self::Aggregate;
}

/// Reduces partial results in any order.
///
/// # Examples
///
/// ```rust
/// use mc_engine::kernels::{reduce, PiPartial};
///
/// let total = reduce(vec![
///     PiPartial { trials: 10, inside: 8, samples: Vec::new() },
///     PiPartial { trials: 10, inside: 7, samples: Vec::new() },
/// ]);
/// assert_eq!(total.trials, 20);
/// assert_eq!(total.inside, 15);
/// ```
pub fn reduce<P: Mergeable>(partials: impl IntoIterator<Item = P>) -> P {
    partials.into_iter().fold(P::default(), Mergeable::merge)
}

#[inline]
pub(crate) fn check_cancelled(
    trial: usize,
    cancel: &CancellationToken,
) -> Result<(), SimulationError> {
    if trial % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
        return Err(SimulationError::Cancelled);
    }
    Ok(())
}
