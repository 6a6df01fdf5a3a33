//! Scaling sweep configuration.

use crate::error::ScalingError;
use crate::laws::{ScalingLaw, SerialFraction};
use mc_core::types::TrialCount;
use mc_engine::executor::{ExecutorConfig, MAX_WORKERS};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Worker counts swept when none are configured.
pub const DEFAULT_WORKER_COUNTS: RangeInclusive<usize> = 2..=13;

/// How the problem size relates to the worker count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalingMode {
    /// Fixed problem size for every worker count.
    #[default]
    Strong,
    /// Problem size grows linearly with the worker count.
    Weak,
}

impl ScalingMode {
    /// Law a sweep in this mode is compared against unless overridden.
    pub fn default_law(self) -> ScalingLaw {
        match self {
            Self::Strong => ScalingLaw::Amdahl,
            Self::Weak => ScalingLaw::Gustafson,
        }
    }
}

/// What a sweep does when one of its runs fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the sweep and return the failure.
    #[default]
    Abort,
    /// Record the failure and carry on with the next worker count.
    Continue,
}

/// Scaling sweep configuration.
///
/// Use [`ScalingConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use mc_core::types::TrialCount;
/// use mc_scaling::{ScalingConfig, ScalingLaw, ScalingMode};
///
/// let config = ScalingConfig::builder()
///     .mode(ScalingMode::Weak)
///     .base_trials(TrialCount::new(1_000).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.law(), ScalingLaw::Gustafson);
/// assert_eq!(config.worker_counts(), 2..=13);
/// ```
#[derive(Clone, Debug)]
pub struct ScalingConfig {
    mode: ScalingMode,
    base_trials: TrialCount,
    worker_counts: RangeInclusive<usize>,
    serial_fraction: SerialFraction,
    law: ScalingLaw,
    failure_policy: FailurePolicy,
    executor: ExecutorConfig,
}

impl ScalingConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> ScalingConfigBuilder {
        ScalingConfigBuilder::default()
    }

    /// Returns the sweep mode.
    #[inline]
    pub fn mode(&self) -> ScalingMode {
        self.mode
    }

    /// Returns the trial count of the smallest run.
    #[inline]
    pub fn base_trials(&self) -> TrialCount {
        self.base_trials
    }

    /// Returns the swept worker counts.
    #[inline]
    pub fn worker_counts(&self) -> RangeInclusive<usize> {
        self.worker_counts.clone()
    }

    /// Returns the assumed serial fraction.
    #[inline]
    pub fn serial_fraction(&self) -> SerialFraction {
        self.serial_fraction
    }

    /// Returns the law achieved speedups are compared against.
    #[inline]
    pub fn law(&self) -> ScalingLaw {
        self.law
    }

    /// Returns the failure policy.
    #[inline]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Returns the configuration shared by every executor of the sweep.
    #[inline]
    pub fn executor(&self) -> &ExecutorConfig {
        &self.executor
    }
}

/// Builder for [`ScalingConfig`].
#[derive(Clone, Debug, Default)]
pub struct ScalingConfigBuilder {
    mode: ScalingMode,
    base_trials: Option<TrialCount>,
    worker_counts: Option<RangeInclusive<usize>>,
    serial_fraction: Option<f64>,
    law: Option<ScalingLaw>,
    failure_policy: FailurePolicy,
    executor: Option<ExecutorConfig>,
}

impl ScalingConfigBuilder {
    /// Sets the sweep mode.
    #[inline]
    pub fn mode(mut self, mode: ScalingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the trial count of the smallest run.
    #[inline]
    pub fn base_trials(mut self, trials: TrialCount) -> Self {
        self.base_trials = Some(trials);
        self
    }

    /// Sets the swept worker counts.
    #[inline]
    pub fn worker_counts(mut self, workers: RangeInclusive<usize>) -> Self {
        self.worker_counts = Some(workers);
        self
    }

    /// Sets the serial fraction assumed by the theoretical law.
    ///
    /// # Arguments
    ///
    /// * `fraction` - Serial fraction in [0, 1]
    #[inline]
    pub fn serial_fraction(mut self, fraction: f64) -> Self {
        self.serial_fraction = Some(fraction);
        self
    }

    /// Overrides the mode's default law.
    #[inline]
    pub fn law(mut self, law: ScalingLaw) -> Self {
        self.law = Some(law);
        self
    }

    /// Sets the failure policy.
    #[inline]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the configuration shared by every executor of the sweep.
    #[inline]
    pub fn executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ScalingError::InvalidSweep` if:
    /// - `base_trials` was not set
    /// - the worker range is empty, starts at 0 or exceeds the executor's worker cap
    /// - the serial fraction lies outside `[0, 1]`
    pub fn build(self) -> Result<ScalingConfig, ScalingError> {
        let base_trials = self
            .base_trials
            .ok_or_else(|| ScalingError::invalid_sweep("base_trials must be specified"))?;

        let executor = self.executor.unwrap_or_default();
        let worker_counts = self.worker_counts.unwrap_or(DEFAULT_WORKER_COUNTS);
        let (first, last) = (*worker_counts.start(), *worker_counts.end());
        if first == 0 || first > last {
            return Err(ScalingError::invalid_sweep(format!(
                "worker range {}..={} must be non-empty and start at 1 or more",
                first, last
            )));
        }
        let cap = executor.max_workers().min(MAX_WORKERS);
        if last > cap {
            return Err(ScalingError::invalid_sweep(format!(
                "worker range {}..={} exceeds the cap of {} workers",
                first, last, cap
            )));
        }

        let fraction = self.serial_fraction.unwrap_or(0.0);
        let serial_fraction = SerialFraction::new(fraction).ok_or_else(|| {
            ScalingError::invalid_sweep(format!(
                "serial fraction must be in [0, 1], got {}",
                fraction
            ))
        })?;

        Ok(ScalingConfig {
            mode: self.mode,
            base_trials,
            worker_counts,
            serial_fraction,
            law: self.law.unwrap_or_else(|| self.mode.default_law()),
            failure_policy: self.failure_policy,
            executor,
        })
    }
}
