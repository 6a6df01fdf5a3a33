//! Executor configuration.

use crate::rng::NormalMethod;
use mc_core::types::SimulationError;

/// Upper bound on the worker count accepted by executors.
pub const MAX_WORKERS: usize = 1024;

/// What to do with the `N mod P` trials that do not divide evenly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RemainderPolicy {
    /// Every worker runs `⌊N / P⌋` trials; the remainder is never run.
    Drop,

    /// The first `N mod P` workers run one extra trial, so exactly `N` run.
    #[default]
    Distribute,
}

/// Executor configuration.
///
/// Use [`ExecutorConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use mc_engine::executor::{ExecutorConfig, RemainderPolicy};
///
/// let config = ExecutorConfig::builder()
///     .seed(42)
///     .remainder(RemainderPolicy::Drop)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.seed(), Some(42));
/// assert_eq!(config.remainder(), RemainderPolicy::Drop);
/// ```
#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    /// Base seed; `None` draws a fresh one per run.
    seed: Option<u64>,
    /// Remainder handling.
    remainder: RemainderPolicy,
    /// Normal deviate method for every worker stream.
    normal_method: NormalMethod,
    /// Largest accepted worker count.
    max_workers: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            remainder: RemainderPolicy::default(),
            normal_method: NormalMethod::default(),
            max_workers: MAX_WORKERS,
        }
    }
}

impl ExecutorConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }

    /// Returns the base seed, if fixed.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the remainder policy.
    #[inline]
    pub fn remainder(&self) -> RemainderPolicy {
        self.remainder
    }

    /// Returns the normal deviate method.
    #[inline]
    pub fn normal_method(&self) -> NormalMethod {
        self.normal_method
    }

    /// Returns the largest accepted worker count.
    #[inline]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if `max_workers` is 0
    /// or greater than [`MAX_WORKERS`].
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.max_workers == 0 || self.max_workers > MAX_WORKERS {
            return Err(SimulationError::invalid_configuration(format!(
                "max_workers must be in [1, {}], got {}",
                MAX_WORKERS, self.max_workers
            )));
        }
        Ok(())
    }
}

/// Builder for [`ExecutorConfig`].
#[derive(Clone, Debug, Default)]
pub struct ExecutorConfigBuilder {
    seed: Option<u64>,
    remainder: RemainderPolicy,
    normal_method: NormalMethod,
    max_workers: Option<usize>,
}

impl ExecutorConfigBuilder {
    /// Fixes the base seed so runs are reproducible.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the base seed, or clears it with `None`.
    #[inline]
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the remainder policy.
    #[inline]
    pub fn remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// Sets the normal deviate method.
    #[inline]
    pub fn normal_method(mut self, normal_method: NormalMethod) -> Self {
        self.normal_method = normal_method;
        self
    }

    /// Sets the largest accepted worker count.
    ///
    /// # Arguments
    ///
    /// * `max_workers` - Cap in [1, 1024]
    #[inline]
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if the worker cap is invalid.
    pub fn build(self) -> Result<ExecutorConfig, SimulationError> {
        let config = ExecutorConfig {
            seed: self.seed,
            remainder: self.remainder,
            normal_method: self.normal_method,
            max_workers: self.max_workers.unwrap_or(MAX_WORKERS),
        };
        config.validate()?;
        Ok(config)
    }
}
