//! Theoretical speedup bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amdahl's law: speedup of a fixed workload on `workers` workers.
///
/// `S(P) = 1 / (f + (1 − f) / P)` for serial fraction `f`.
///
/// # Examples
///
/// ```rust
/// use mc_scaling::amdahl_speedup;
///
/// assert_eq!(amdahl_speedup(8, 0.0), 8.0);
/// assert!((amdahl_speedup(8, 0.5) - 16.0 / 9.0).abs() < 1e-12);
/// ```
#[inline]
pub fn amdahl_speedup(workers: usize, serial_fraction: f64) -> f64 {
    1.0 / (serial_fraction + (1.0 - serial_fraction) / workers as f64)
}

/// Gustafson's law: scaled speedup when the workload grows with `workers`.
///
/// `S(P) = f + (1 − f) · P` for serial fraction `f`.
///
/// # Examples
///
/// ```rust
/// use mc_scaling::gustafson_speedup;
///
/// assert_eq!(gustafson_speedup(8, 0.0), 8.0);
/// assert_eq!(gustafson_speedup(8, 0.5), 4.5);
/// ```
#[inline]
pub fn gustafson_speedup(workers: usize, serial_fraction: f64) -> f64 {
    serial_fraction + (1.0 - serial_fraction) * workers as f64
}

/// Fraction of a workload that cannot be parallelised, in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SerialFraction(f64);

impl SerialFraction {
    /// Fully parallelisable workload.
    pub const ZERO: SerialFraction = SerialFraction(0.0);

    /// Creates a serial fraction, rejecting values outside `[0, 1]`.
    pub fn new(fraction: f64) -> Option<Self> {
        (0.0..=1.0).contains(&fraction).then_some(Self(fraction))
    }

    /// Returns the fraction.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for SerialFraction {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("serial fraction must be in [0, 1], got {}", value))
    }
}

impl From<SerialFraction> for f64 {
    fn from(fraction: SerialFraction) -> Self {
        fraction.0
    }
}

/// Theoretical model a sweep is compared against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalingLaw {
    /// Fixed workload; see [`amdahl_speedup`].
    Amdahl,
    /// Workload scaled with workers; see [`gustafson_speedup`].
    Gustafson,
}

impl ScalingLaw {
    /// Theoretical speedup on `workers` workers.
    pub fn speedup(self, workers: usize, serial_fraction: SerialFraction) -> f64 {
        match self {
            Self::Amdahl => amdahl_speedup(workers, serial_fraction.get()),
            Self::Gustafson => gustafson_speedup(workers, serial_fraction.get()),
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Amdahl => "amdahl",
            Self::Gustafson => "gustafson",
        }
    }
}

impl fmt::Display for ScalingLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
