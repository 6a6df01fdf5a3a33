//! Run parameter and error types.
//!
//! This module provides:
//! - `counts`: validated [`TrialCount`] and [`WorkerCount`] newtypes
//! - `domain`: the [`Domain`] an estimation run belongs to
//! - `error`: the [`SimulationError`] taxonomy
//!
//! # Re-exports
//!
//! All public types are re-exported at this module level.

pub mod counts;
pub mod domain;
pub mod error;

pub use counts::{TrialCount, WorkerCount};
pub use domain::Domain;
pub use error::SimulationError;
