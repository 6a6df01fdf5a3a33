//! Estimation domains.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The quantity an estimation run targets.
///
/// Used to label runs in logs, errors and scaling reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Estimate of π from points in the unit square.
    Pi,
    /// Definite integral by rejection sampling.
    Integral,
    /// Simulated future price paths.
    PricePath,
}

impl Domain {
    /// Get the domain name for display
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::Integral => "integral",
            Self::PricePath => "price-path",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
