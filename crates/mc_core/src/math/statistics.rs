//! Descriptive statistics and the standard normal quantile.
//!
//! These are thin wrappers over `statrs` so that callers work with plain
//! slices and never see the trait machinery. Variance is the unbiased
//! sample variance (divisor `n - 1`).

use statrs::function::erf::erfc_inv;
use statrs::statistics::Statistics;
use std::f64::consts::SQRT_2;

/// Arithmetic mean of `values`.
///
/// Returns `NaN` for an empty slice.
///
/// # Examples
///
/// ```rust
/// use mc_core::math::statistics::mean;
///
/// assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
/// ```
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Unbiased sample variance of `values`.
///
/// A slice with fewer than two values has no spread to measure; it yields
/// `0.0` rather than `NaN` so a two-point price history still produces a
/// (deterministic) drift.
///
/// # Examples
///
/// ```rust
/// use mc_core::math::statistics::sample_variance;
///
/// assert!((sample_variance(&[1.0, 2.0, 3.0, 4.0]) - 5.0 / 3.0).abs() < 1e-12);
/// assert_eq!(sample_variance(&[0.5]), 0.0);
/// ```
#[inline]
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().variance()
}

/// Sample standard deviation of `values`.
#[inline]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Inverse of the standard normal CDF.
///
/// Maps a probability in the open interval (0, 1) to the z-score below which
/// that fraction of a standard normal population lies. The endpoints map to
/// `-inf` and `+inf`.
///
/// # Examples
///
/// ```rust
/// use mc_core::math::statistics::standard_normal_quantile;
///
/// assert!(standard_normal_quantile(0.5).abs() < 1e-12);
/// assert!((standard_normal_quantile(0.975) - 1.959964).abs() < 1e-5);
/// ```
#[inline]
pub fn standard_normal_quantile(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance_of_log_returns() {
        let returns = [0.01, -0.02, 0.03];

        assert_relative_eq!(mean(&returns), 0.02 / 3.0, epsilon = 1e-15);

        // Deviations: 1/300, -8/300, 7/300 -> sum of squares 114/90000, over n - 1 = 2.
        assert_relative_eq!(sample_variance(&returns), 114.0 / 180_000.0, epsilon = 1e-15);
        assert_relative_eq!(
            sample_std_dev(&returns),
            (114.0_f64 / 180_000.0).sqrt(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_degenerate_variance() {
        assert_eq!(sample_variance(&[]), 0.0);
        assert_eq!(sample_variance(&[0.42]), 0.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_quantile_symmetry() {
        for p in [0.01, 0.1, 0.25, 0.4] {
            assert_relative_eq!(
                standard_normal_quantile(p),
                -standard_normal_quantile(1.0 - p),
                epsilon = 1e-9
            );
        }
        assert!(standard_normal_quantile(0.1) < 0.0);
        assert_relative_eq!(standard_normal_quantile(0.8413447), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_quantile_endpoints() {
        assert!(standard_normal_quantile(0.0).is_infinite());
        assert!(standard_normal_quantile(1.0).is_infinite());
    }
}
