//! Per-worker random stream.

use mc_core::math::statistics::standard_normal_quantile;
use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// How a [`RandomStream`] turns uniform draws into standard normal deviates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum NormalMethod {
    /// Quantile transform of a uniform draw in (0, 1).
    #[default]
    InverseCdf,

    /// Ziggurat sampling via `rand_distr::StandardNormal`.
    Ziggurat,
}

/// Uniform and normal deviates for a single worker.
///
/// # Examples
///
/// ```rust
/// use mc_engine::rng::RandomStream;
///
/// let mut a = RandomStream::from_seed(7);
/// let mut b = RandomStream::from_seed(7);
/// assert_eq!(a.uniform(), b.uniform());
/// assert_eq!(a.standard_normal(), b.standard_normal());
/// ```
#[derive(Clone, Debug)]
pub struct RandomStream {
    /// The underlying PRNG instance.
    inner: StdRng,
    /// The seed used for initialisation (kept for log output).
    seed: u64,
    /// Normal deviate generation method.
    normal_method: NormalMethod,
}

impl RandomStream {
    /// Creates a stream initialised with `seed`, using the inverse-CDF method
    /// for normal deviates.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
            normal_method: NormalMethod::default(),
        }
    }

    /// Switches the normal deviate method.
    #[inline]
    pub fn with_normal_method(mut self, normal_method: NormalMethod) -> Self {
        self.normal_method = normal_method;
        self
    }

    /// Returns the seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the normal deviate method.
    #[inline]
    pub fn normal_method(&self) -> NormalMethod {
        self.normal_method
    }

    /// Draws a uniform value in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Draws a uniform value in [low, high).
    ///
    /// Returns `low` when the interval is empty.
    #[inline]
    pub fn uniform_in(&mut self, low: f64, high: f64) -> f64 {
        scale_unit(low, high, self.uniform())
    }

    /// Draws a standard normal deviate (mean 0, standard deviation 1).
    ///
    /// With [`NormalMethod::InverseCdf`] the uniform is drawn from the open
    /// interval (0, 1), so the quantile transform never yields an infinity.
    #[inline]
    pub fn standard_normal(&mut self) -> f64 {
        match self.normal_method {
            NormalMethod::InverseCdf => {
                let p: f64 = self.inner.sample(Open01);
                standard_normal_quantile(p)
            }
            NormalMethod::Ziggurat => StandardNormal.sample(&mut self.inner),
        }
    }

    /// Fills `buffer` with uniform values in [0, 1).
    #[inline]
    pub fn fill_uniform(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.uniform();
        }
    }

    /// Fills `buffer` with standard normal deviates.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.standard_normal();
        }
    }
}

/// Maps `u` in [0, 1) onto [low, high).
///
/// `low + (high - low) * u` rounds up to `high` for `u` close to 1, so the
/// result is pulled back to the largest value below `high`.
#[inline]
pub(crate) fn scale_unit(low: f64, high: f64, u: f64) -> f64 {
    let x = low + (high - low) * u;
    if x < high || high <= low {
        x
    } else {
        below(high).max(low)
    }
}

/// Largest `f64` strictly below the finite value `x`.
fn below(x: f64) -> f64 {
    if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else if x == 0.0 {
        -f64::from_bits(1)
    } else {
        f64::from_bits(x.to_bits() + 1)
    }
}
