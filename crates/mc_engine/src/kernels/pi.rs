//! π by uniform sampling of the unit square.

use super::{check_cancelled, Mergeable, SamplePoint, SamplingKernel};
use crate::executor::CancellationToken;
use crate::rng::RandomStream;
use mc_core::types::{Domain, SimulationError};

/// Counts points of the unit square that land strictly inside the quarter
/// circle `x² + y² < 1`.
///
/// # Examples
///
/// ```rust
/// use mc_engine::executor::CancellationToken;
/// use mc_engine::kernels::{PiKernel, SamplingKernel};
/// use mc_engine::rng::RandomStream;
///
/// let kernel = PiKernel::new();
/// let mut stream = RandomStream::from_seed(42);
/// let partial = kernel.sample(100_000, &mut stream, &CancellationToken::new()).unwrap();
/// let estimate = kernel.finalize(partial);
/// assert!((estimate.estimate - std::f64::consts::PI).abs() < 0.05);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PiKernel {
    capture_samples: bool,
}

impl PiKernel {
    /// Creates a kernel that only counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps every drawn point in the partial result when `capture` is set.
    pub fn with_sample_capture(mut self, capture: bool) -> Self {
        self.capture_samples = capture;
        self
    }

    /// Returns whether drawn points are kept.
    #[inline]
    pub fn captures_samples(&self) -> bool {
        self.capture_samples
    }
}

/// One worker's count of points inside the quarter circle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PiPartial {
    /// Trials run.
    pub trials: usize,
    /// Trials with `x² + y² < 1`.
    pub inside: u64,
    /// Drawn points (empty unless capture is enabled).
    pub samples: Vec<SamplePoint>,
}

impl Mergeable for PiPartial {
    fn merge(mut self, other: Self) -> Self {
        self.trials += other.trials;
        self.inside += other.inside;
        self.samples.extend(other.samples);
        self
    }

    fn trials(&self) -> usize {
        self.trials
    }
}

/// Estimated value of π.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PiEstimate {
    /// Trials run across all workers.
    pub trials: usize,
    /// Points inside the quarter circle.
    pub inside: u64,
    /// `4 · inside / trials`.
    pub estimate: f64,
    /// Drawn points (empty unless capture is enabled).
    #[cfg_attr(feature = "serde", serde(skip))]
    pub samples: Vec<SamplePoint>,
}

impl PiEstimate {
    /// Absolute distance from π.
    pub fn abs_error(&self) -> f64 {
        (self.estimate - std::f64::consts::PI).abs()
    }

    /// Standard error of the estimate, from the binomial variance of the hit ratio.
    pub fn std_error(&self) -> f64 {
        if self.trials == 0 {
            return f64::NAN;
        }
        let p = self.inside as f64 / self.trials as f64;
        4.0 * (p * (1.0 - p) / self.trials as f64).sqrt()
    }
}

impl SamplingKernel for PiKernel {
    type Partial = PiPartial;
    type Aggregate = PiEstimate;

    fn domain(&self) -> Domain {
        Domain::Pi
    }

    fn sample(
        &self,
        trials: usize,
        stream: &mut RandomStream,
        cancel: &CancellationToken,
    ) -> Result<PiPartial, SimulationError> {
        let mut inside = 0u64;
        let mut samples = if self.capture_samples {
            Vec::with_capacity(trials)
        } else {
            Vec::new()
        };

        for trial in 0..trials {
            check_cancelled(trial, cancel)?;
            let x = stream.uniform();
            let y = stream.uniform();
            if x * x + y * y < 1.0 {
                inside += 1;
            }
            if self.capture_samples {
                samples.push(SamplePoint { x, y });
            }
        }

        Ok(PiPartial {
            trials,
            inside,
            samples,
        })
    }

    fn finalize(&self, total: PiPartial) -> PiEstimate {
        let estimate = if total.trials == 0 {
            f64::NAN
        } else {
            4.0 * total.inside as f64 / total.trials as f64
        };
        PiEstimate {
            trials: total.trials,
            inside: total.inside,
            estimate,
            samples: total.samples,
        }
    }
}
