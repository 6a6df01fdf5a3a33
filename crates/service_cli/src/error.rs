//! Error types for the command line.

use mc_core::types::SimulationError;
use mc_engine::executor::RunError;
use mc_scaling::ScalingError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by `mcsim` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An estimation run failed.
    #[error(transparent)]
    Run(#[from] RunError),

    /// Kernel or run parameters were rejected before any run started.
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// A scaling sweep failed.
    #[error(transparent)]
    Scaling(#[from] ScalingError),

    /// A command-line argument is invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Writing output or an export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for `mcsim` commands.
pub type Result<T> = std::result::Result<T, CliError>;
