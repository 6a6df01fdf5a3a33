//! Definite integrals by rejection sampling.
//!
//! The integrand must be non-negative and continuous on `[a, b]`. Points are
//! drawn uniformly from the rectangle `[a, b) × [0, f_max)` and the integral is
//! the fraction below the curve times the rectangle's area.
//!
//! `f_max` is the largest integrand value on a fixed grid `a, a + step, ...`
//! (stopping before `b`), not the true supremum. For integrands whose peak
//! falls between grid points the rectangle is slightly too short and the
//! estimate is biased low.

use super::{check_cancelled, Mergeable, SamplePoint, SamplingKernel};
use crate::executor::CancellationToken;
use crate::rng::RandomStream;
use mc_core::types::{Domain, SimulationError};

/// Default spacing of the grid used to bound the integrand.
pub const DEFAULT_GRID_STEP: f64 = 0.01;

/// Largest grid accepted when bounding the integrand.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Maximum of `integrand` over the grid `lower, lower + step, ...` while `< upper`.
///
/// Grid points are computed as `lower + k · step` so rounding does not
/// accumulate along the scan. Also reports the smallest grid value, which the
/// kernel uses to reject integrands that dip below zero.
///
/// # Examples
///
/// ```rust
/// use mc_engine::kernels::grid_maximum;
///
/// let (max, min) = grid_maximum(&|x: f64| 2.0 * x, 1.0, 2.0, 0.01);
/// assert!((max - 3.98).abs() < 1e-9);
/// assert_eq!(min, 2.0);
/// ```
pub fn grid_maximum<F>(integrand: &F, lower: f64, upper: f64, step: f64) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let first = integrand(lower);
    let (mut max, mut min) = (first, first);
    let mut k = 1u64;
    loop {
        let x = lower + k as f64 * step;
        if x >= upper {
            break;
        }
        let y = integrand(x);
        max = max.max(y);
        min = min.min(y);
        k += 1;
    }
    (max, min)
}

/// Rejection-sampling kernel for `∫ₐᵇ f(x) dx`.
///
/// # Examples
///
/// ```rust
/// use mc_engine::executor::CancellationToken;
/// use mc_engine::kernels::{IntegralKernel, SamplingKernel};
/// use mc_engine::rng::RandomStream;
///
/// let kernel = IntegralKernel::new(|x: f64| 2.0 * x, 1.0, 2.0).unwrap();
/// let mut stream = RandomStream::from_seed(7);
/// let partial = kernel.sample(200_000, &mut stream, &CancellationToken::new()).unwrap();
/// let estimate = kernel.finalize(partial);
/// assert!((estimate.estimate - 3.0).abs() < 0.05);
///
/// assert!(IntegralKernel::new(|x: f64| x, 2.0, 1.0).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct IntegralKernel<F> {
    integrand: F,
    lower: f64,
    upper: f64,
    grid_step: f64,
    f_max: f64,
    capture_samples: bool,
}

impl<F> IntegralKernel<F>
where
    F: Fn(f64) -> f64 + Sync,
{
    /// Creates a kernel bounding the integrand on the default grid.
    ///
    /// # Errors
    ///
    /// See [`IntegralKernel::with_grid_step`].
    pub fn new(integrand: F, lower: f64, upper: f64) -> Result<Self, SimulationError> {
        Self::with_grid_step(integrand, lower, upper, DEFAULT_GRID_STEP)
    }

    /// Creates a kernel bounding the integrand on a grid of spacing `grid_step`.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameters` if:
    /// - a bound is not finite or `lower >= upper`
    /// - `grid_step` is not a positive finite number or yields more than
    ///   [`MAX_GRID_POINTS`] grid points
    /// - the integrand is negative or not finite somewhere on the grid
    pub fn with_grid_step(
        integrand: F,
        lower: f64,
        upper: f64,
        grid_step: f64,
    ) -> Result<Self, SimulationError> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(SimulationError::invalid_parameters(format!(
                "integration bounds must be finite, got [{}, {}]",
                lower, upper
            )));
        }
        if lower >= upper {
            return Err(SimulationError::invalid_parameters(format!(
                "lower bound {} must be below upper bound {}",
                lower, upper
            )));
        }
        if !grid_step.is_finite() || grid_step <= 0.0 {
            return Err(SimulationError::invalid_parameters(format!(
                "grid step must be positive, got {}",
                grid_step
            )));
        }
        if (upper - lower) / grid_step > MAX_GRID_POINTS as f64 {
            return Err(SimulationError::invalid_parameters(format!(
                "grid step {} over [{}, {}] exceeds {} points",
                grid_step, lower, upper, MAX_GRID_POINTS
            )));
        }

        let (f_max, f_min) = grid_maximum(&integrand, lower, upper, grid_step);
        if !f_max.is_finite() || !f_min.is_finite() {
            return Err(SimulationError::invalid_parameters(
                "integrand is not finite on the sampling grid",
            ));
        }
        if f_min < 0.0 {
            return Err(SimulationError::invalid_parameters(format!(
                "integrand must be non-negative, found {} on [{}, {}]",
                f_min, lower, upper
            )));
        }

        Ok(Self {
            integrand,
            lower,
            upper,
            grid_step,
            f_max,
            capture_samples: false,
        })
    }

    /// Keeps every drawn point in the partial result when `capture` is set.
    pub fn with_sample_capture(mut self, capture: bool) -> Self {
        self.capture_samples = capture;
        self
    }

    /// Returns the lower integration bound.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Returns the upper integration bound.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Returns the grid spacing used to bound the integrand.
    #[inline]
    pub fn grid_step(&self) -> f64 {
        self.grid_step
    }

    /// Returns the height of the bounding rectangle.
    #[inline]
    pub fn f_max(&self) -> f64 {
        self.f_max
    }

    /// Returns the area of the bounding rectangle.
    #[inline]
    pub fn rectangle_area(&self) -> f64 {
        (self.upper - self.lower) * self.f_max
    }
}

/// One worker's count of points below the curve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntegralPartial {
    /// Trials run.
    pub trials: usize,
    /// Trials with `y < f(x)`.
    pub below: u64,
    /// Drawn points (empty unless capture is enabled).
    pub samples: Vec<SamplePoint>,
}

impl Mergeable for IntegralPartial {
    fn merge(mut self, other: Self) -> Self {
        self.trials += other.trials;
        self.below += other.below;
        self.samples.extend(other.samples);
        self
    }

    fn trials(&self) -> usize {
        self.trials
    }
}

/// Estimated value of a definite integral.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IntegralEstimate {
    /// Trials run across all workers.
    pub trials: usize,
    /// Points below the curve.
    pub below: u64,
    /// Lower integration bound.
    pub lower: f64,
    /// Upper integration bound.
    pub upper: f64,
    /// Height of the bounding rectangle.
    pub f_max: f64,
    /// `(below / trials) · (b − a) · f_max`.
    pub estimate: f64,
    /// Drawn points (empty unless capture is enabled).
    #[cfg_attr(feature = "serde", serde(skip))]
    pub samples: Vec<SamplePoint>,
}

impl<F> SamplingKernel for IntegralKernel<F>
where
    F: Fn(f64) -> f64 + Sync,
{
    type Partial = IntegralPartial;
    type Aggregate = IntegralEstimate;

    fn domain(&self) -> Domain {
        Domain::Integral
    }

    fn sample(
        &self,
        trials: usize,
        stream: &mut RandomStream,
        cancel: &CancellationToken,
    ) -> Result<IntegralPartial, SimulationError> {
        let mut below = 0u64;
        let mut samples = if self.capture_samples {
            Vec::with_capacity(trials)
        } else {
            Vec::new()
        };

        for trial in 0..trials {
            check_cancelled(trial, cancel)?;
            let x = stream.uniform_in(self.lower, self.upper);
            let y = stream.uniform_in(0.0, self.f_max);
            if y < (self.integrand)(x) {
                below += 1;
            }
            if self.capture_samples {
                samples.push(SamplePoint { x, y });
            }
        }

        Ok(IntegralPartial {
            trials,
            below,
            samples,
        })
    }

    fn finalize(&self, total: IntegralPartial) -> IntegralEstimate {
        let estimate = if total.trials == 0 {
            f64::NAN
        } else {
            total.below as f64 / total.trials as f64 * self.rectangle_area()
        };
        IntegralEstimate {
            trials: total.trials,
            below: total.below,
            lower: self.lower,
            upper: self.upper,
            f_max: self.f_max,
            estimate,
            samples: total.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = IntegralKernel::new(|x: f64| x, 2.0, 1.0).err().unwrap();
        assert!(matches!(err, SimulationError::InvalidParameters(_)));

        let err = IntegralKernel::new(|x: f64| x, 1.0, 1.0).err().unwrap();
        assert!(err.to_string().contains("must be below"));
    }

    #[test]
    fn test_bad_grid_step_rejected() {
        assert!(IntegralKernel::with_grid_step(|x: f64| x, 0.0, 1.0, 0.0).is_err());
        assert!(IntegralKernel::with_grid_step(|x: f64| x, 0.0, 1.0, f64::NAN).is_err());
        assert!(IntegralKernel::with_grid_step(|x: f64| x, 0.0, 1e9, 1e-3).is_err());
    }

    #[test]
    fn test_negative_integrand_rejected() {
        let err = IntegralKernel::new(|x: f64| x - 1.5, 1.0, 2.0).err().unwrap();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_non_finite_integrand_rejected() {
        assert!(IntegralKernel::new(|x: f64| 1.0 / x, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_grid_maximum_of_linear_integrand() {
        let kernel = IntegralKernel::new(|x: f64| 2.0 * x, 1.0, 2.0).unwrap();
        // Last grid point is 1.99, so the bound stops just short of f(2) = 4.
        assert_relative_eq!(kernel.f_max(), 3.98, epsilon = 1e-9);
        assert_relative_eq!(kernel.rectangle_area(), 3.98, epsilon = 1e-9);
    }

    #[test]
    fn test_grid_underestimates_narrow_peak() {
        // Peak of the tent at 0.005 lies between the grid points 0.0 and 0.01.
        let tent = |x: f64| (1.0 - (x - 0.005).abs() * 200.0).max(0.0);
        let (max, _) = grid_maximum(&tent, 0.0, 1.0, 0.01);
        assert!(max < 0.01);
    }

    #[test]
    fn test_samples_lie_in_rectangle() {
        let kernel = IntegralKernel::new(|x: f64| x * x, 0.0, 3.0)
            .unwrap()
            .with_sample_capture(true);
        let mut stream = RandomStream::from_seed(11);
        let partial = kernel
            .sample(2_000, &mut stream, &CancellationToken::new())
            .unwrap();

        assert_eq!(partial.trials, 2_000);
        assert_eq!(partial.samples.len(), 2_000);
        for point in &partial.samples {
            assert!((0.0..3.0).contains(&point.x));
            assert!((0.0..kernel.f_max()).contains(&point.y));
        }
    }

    #[test]
    fn test_finalize_formula() {
        let kernel = IntegralKernel::new(|x: f64| 2.0 * x, 1.0, 2.0).unwrap();
        let estimate = kernel.finalize(IntegralPartial {
            trials: 100,
            below: 75,
            samples: vec![],
        });
        assert_relative_eq!(estimate.estimate, 0.75 * 3.98, epsilon = 1e-9);
        assert_eq!(estimate.below, 75);
    }
}
