//! Geometric Brownian motion price paths from historical closes.
//!
//! Daily log returns `rᵢ = ln(pᵢ / pᵢ₋₁)` give the per-step parameters
//!
//! ```text
//! drift = mean(r) − variance(r) / 2
//! p(t+1) = p(t) · exp(drift + σ · Z),   Z ~ N(0, 1)
//! ```
//!
//! where `σ` is the sample standard deviation of the returns. Every path
//! starts at the last historical close and takes `window` steps.

use super::{Mergeable, SamplingKernel};
use crate::executor::CancellationToken;
use crate::rng::RandomStream;
use mc_core::market_data::{PriceHistoryRequest, PriceSource};
use mc_core::math::statistics::{mean, sample_variance};
use mc_core::types::{Domain, SimulationError};

/// Log returns of consecutive prices.
///
/// # Examples
///
/// ```rust
/// use mc_engine::kernels::log_returns;
///
/// let returns = log_returns(&[100.0, 110.0, 99.0]);
/// assert_eq!(returns.len(), 2);
/// assert!((returns[0] - 1.1f64.ln()).abs() < 1e-12);
/// ```
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// Drift and volatility estimated from log returns.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReturnStatistics {
    /// Mean log return.
    pub mean: f64,
    /// Sample variance of the log returns (`0.0` for a single return).
    pub variance: f64,
    /// Square root of `variance`.
    pub std_dev: f64,
    /// `mean − variance / 2`.
    pub drift: f64,
}

impl ReturnStatistics {
    /// Estimates the statistics of `returns`.
    pub fn from_log_returns(returns: &[f64]) -> Self {
        let mean = mean(returns);
        let variance = sample_variance(returns);
        Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
            drift: mean - variance / 2.0,
        }
    }
}

/// Simulates future price paths calibrated to a price history.
///
/// One trial is one path.
///
/// # Examples
///
/// ```rust
/// use mc_engine::executor::CancellationToken;
/// use mc_engine::kernels::{PricePathKernel, SamplingKernel};
/// use mc_engine::rng::RandomStream;
///
/// let kernel = PricePathKernel::new(vec![100.0, 101.0, 100.5, 102.0], 5).unwrap();
/// let mut stream = RandomStream::from_seed(3);
/// let partial = kernel.sample(4, &mut stream, &CancellationToken::new()).unwrap();
/// let forecast = kernel.finalize(partial);
///
/// assert_eq!(forecast.paths.len(), 4);
/// assert!(forecast.paths.iter().all(|p| p.len() == 6 && p[0] == 102.0));
/// ```
#[derive(Clone, Debug)]
pub struct PricePathKernel {
    prices: Vec<f64>,
    window: usize,
    stats: ReturnStatistics,
}

impl PricePathKernel {
    /// Calibrates a kernel to `prices` (oldest first) with `window` steps per path.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameters` if fewer than two prices
    /// are given, a price is not a positive finite number, or `window` is zero.
    pub fn new(prices: Vec<f64>, window: usize) -> Result<Self, SimulationError> {
        if prices.len() < 2 {
            return Err(SimulationError::invalid_parameters(format!(
                "at least 2 prices are required, got {}",
                prices.len()
            )));
        }
        if let Some((index, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(SimulationError::invalid_parameters(format!(
                "price {} at index {} is not a positive finite number",
                price, index
            )));
        }
        if window == 0 {
            return Err(SimulationError::invalid_parameters(
                "simulation window must be at least 1 step",
            ));
        }

        let stats = ReturnStatistics::from_log_returns(&log_returns(&prices));
        Ok(Self {
            prices,
            window,
            stats,
        })
    }

    /// Fetches closes from `source` and calibrates a kernel to them.
    ///
    /// # Errors
    ///
    /// Propagates the source's `UpstreamData` error, then validates as
    /// [`PricePathKernel::new`], so an empty or one-close window is
    /// `InvalidParameters`.
    pub fn from_source(
        source: &dyn PriceSource,
        request: &PriceHistoryRequest,
        window: usize,
    ) -> Result<Self, SimulationError> {
        let prices = source.closing_prices(request)?;
        Self::new(prices, window)
    }

    /// Returns the historical closes.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Returns the number of steps per path.
    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Returns the last historical close, where every path starts.
    #[inline]
    pub fn start_price(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    /// Returns the calibrated return statistics.
    #[inline]
    pub fn statistics(&self) -> ReturnStatistics {
        self.stats
    }

    fn simulate_path(&self, stream: &mut RandomStream) -> Vec<f64> {
        let mut path = Vec::with_capacity(self.window + 1);
        let mut price = self.start_price();
        path.push(price);
        for _ in 0..self.window {
            price *= (self.stats.drift + self.stats.std_dev * stream.standard_normal()).exp();
            path.push(price);
        }
        path
    }
}

/// Paths simulated by one worker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PricePathPartial {
    /// Each path holds `window + 1` prices, starting at the last close.
    pub paths: Vec<Vec<f64>>,
}

impl Mergeable for PricePathPartial {
    fn merge(mut self, other: Self) -> Self {
        self.paths.extend(other.paths);
        self
    }

    fn trials(&self) -> usize {
        self.paths.len()
    }
}

/// Simulated price paths with the parameters that generated them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PricePathForecast {
    /// Steps per path.
    pub window: usize,
    /// Common starting price.
    pub start_price: f64,
    /// Return statistics used for every step.
    pub stats: ReturnStatistics,
    /// The simulated paths, in worker delivery order.
    pub paths: Vec<Vec<f64>>,
}

impl PricePathForecast {
    /// Last price of each path.
    pub fn terminal_prices(&self) -> Vec<f64> {
        self.paths
            .iter()
            .filter_map(|path| path.last().copied())
            .collect()
    }

    /// Average last price across paths (`NaN` without paths).
    pub fn mean_terminal_price(&self) -> f64 {
        mean(&self.terminal_prices())
    }
}

impl SamplingKernel for PricePathKernel {
    type Partial = PricePathPartial;
    type Aggregate = PricePathForecast;

    fn domain(&self) -> Domain {
        Domain::PricePath
    }

    fn sample(
        &self,
        trials: usize,
        stream: &mut RandomStream,
        cancel: &CancellationToken,
    ) -> Result<PricePathPartial, SimulationError> {
        let mut paths = Vec::with_capacity(trials);
        for _ in 0..trials {
            // Paths are long compared to pi or integral trials; poll every path.
            if cancel.is_cancelled() {
                return Err(SimulationError::Cancelled);
            }
            paths.push(self.simulate_path(stream));
        }
        Ok(PricePathPartial { paths })
    }

    fn finalize(&self, total: PricePathPartial) -> PricePathForecast {
        PricePathForecast {
            window: self.window,
            start_price: self.start_price(),
            stats: self.stats,
            paths: total.paths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use mc_core::market_data::InMemoryPriceSource;

    #[test]
    fn test_drift_from_known_returns() {
        let stats = ReturnStatistics::from_log_returns(&[0.01, -0.02, 0.03]);

        let mean: f64 = 0.02 / 3.0;
        let variance = ((0.01 - mean).powi(2) + (-0.02 - mean).powi(2) + (0.03 - mean).powi(2)) / 2.0;
        assert_relative_eq!(stats.mean, mean, epsilon = 1e-12);
        assert_relative_eq!(stats.variance, variance, epsilon = 1e-12);
        assert_relative_eq!(stats.variance, 114.0 / 180_000.0, epsilon = 1e-12);
        assert_relative_eq!(stats.drift, mean - variance / 2.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev, variance.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_two_prices_give_zero_volatility() {
        let kernel = PricePathKernel::new(vec![100.0, 105.0], 3).unwrap();
        let stats = kernel.statistics();
        assert_eq!(stats.variance, 0.0);
        assert_relative_eq!(stats.drift, 1.05f64.ln(), epsilon = 1e-12);

        let mut stream = RandomStream::from_seed(1);
        let partial = kernel
            .sample(2, &mut stream, &CancellationToken::new())
            .unwrap();
        // Without volatility every path compounds the same drift.
        for path in &partial.paths {
            assert_relative_eq!(path[3], 105.0 * 1.05f64.powi(3), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(PricePathKernel::new(vec![100.0], 5).is_err());
        assert!(PricePathKernel::new(vec![100.0, 0.0, 101.0], 5).is_err());
        assert!(PricePathKernel::new(vec![100.0, f64::NAN], 5).is_err());
        let err = PricePathKernel::new(vec![100.0, 101.0], 0).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameters(_)));
    }

    #[test]
    fn test_single_step_matches_formula() {
        let kernel = PricePathKernel::new(vec![50.0, 51.0, 49.5, 52.0], 1).unwrap();
        let stats = kernel.statistics();

        let mut stream = RandomStream::from_seed(99);
        let mut replay = stream.clone();
        let partial = kernel
            .sample(1, &mut stream, &CancellationToken::new())
            .unwrap();

        let z = replay.standard_normal();
        let expected = 52.0 * (stats.drift + stats.std_dev * z).exp();
        assert_eq!(partial.paths, vec![vec![52.0, expected]]);
    }

    #[test]
    fn test_paths_shape_and_merge() {
        let kernel = PricePathKernel::new(vec![10.0, 10.5, 10.2, 10.8, 11.0], 20).unwrap();
        let mut a = RandomStream::from_seed(5);
        let mut b = RandomStream::from_seed(6);
        let cancel = CancellationToken::new();

        let left = kernel.sample(3, &mut a, &cancel).unwrap();
        let right = kernel.sample(2, &mut b, &cancel).unwrap();
        let total = left.merge(right);
        assert_eq!(total.trials(), 5);

        let forecast = kernel.finalize(total);
        assert_eq!(forecast.window, 20);
        for path in &forecast.paths {
            assert_eq!(path.len(), 21);
            assert_eq!(path[0], 11.0);
            assert!(path.iter().all(|p| p.is_finite() && *p > 0.0));
        }
        assert_eq!(forecast.terminal_prices().len(), 5);
        assert!(forecast.mean_terminal_price() > 0.0);
    }

    #[test]
    fn test_cancelled_sampling() {
        let kernel = PricePathKernel::new(vec![10.0, 11.0, 10.5], 10).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut stream = RandomStream::from_seed(0);
        assert_eq!(
            kernel.sample(10, &mut stream, &cancel),
            Err(SimulationError::Cancelled)
        );
    }

    #[test]
    fn test_from_source() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let mut source = InMemoryPriceSource::new();
        source.insert("ACME", vec![(day(1), 20.0), (day(2), 21.0), (day(3), 20.5)]);

        let request = PriceHistoryRequest::new("ACME", day(1), day(3)).unwrap();
        let kernel = PricePathKernel::from_source(&source, &request, 7).unwrap();
        assert_eq!(kernel.prices(), &[20.0, 21.0, 20.5]);
        assert_eq!(kernel.start_price(), 20.5);

        let missing = PriceHistoryRequest::new("NONE", day(1), day(3)).unwrap();
        let err = PricePathKernel::from_source(&source, &missing, 7).unwrap_err();
        assert!(matches!(err, SimulationError::UpstreamData(_)));
    }

    #[test]
    fn test_from_source_rejects_short_windows() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let mut source = InMemoryPriceSource::new();
        source.insert("ACME", vec![(day(20), 20.0), (day(21), 21.0)]);

        let empty = PriceHistoryRequest::new("ACME", day(1), day(5)).unwrap();
        let err = PricePathKernel::from_source(&source, &empty, 5).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameters(_)), "{:?}", err);

        let single = PriceHistoryRequest::new("ACME", day(1), day(20)).unwrap();
        let err = PricePathKernel::from_source(&source, &single, 5).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameters(_)), "{:?}", err);
    }
}
