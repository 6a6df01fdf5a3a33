//! Scaling sweep errors.

use mc_core::types::SimulationError;
use mc_engine::executor::RunError;
use thiserror::Error;

/// Errors raised by a scaling sweep or while writing its report.
#[derive(Debug, Error)]
pub enum ScalingError {
    /// One run of the sweep failed.
    #[error(transparent)]
    Run(#[from] RunError),

    /// The sweep itself is misconfigured.
    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),

    /// Writing the report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the CSV table failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScalingError {
    /// Create an invalid sweep error
    pub fn invalid_sweep(msg: impl Into<String>) -> Self {
        Self::InvalidSweep(msg.into())
    }

    /// Returns true if the sweep stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Run(err) if err.is_cancelled())
    }
}

impl From<SimulationError> for ScalingError {
    fn from(err: SimulationError) -> Self {
        Self::InvalidSweep(err.to_string())
    }
}
