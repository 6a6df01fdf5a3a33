//! # mc_core: Foundation for Parallel Monte Carlo Estimation
//!
//! ## Foundation Role
//!
//! mc_core is the bottom layer of the mcsim workspace, providing:
//! - Run parameters: [`TrialCount`](types::TrialCount), [`WorkerCount`](types::WorkerCount)
//!   and the estimation [`Domain`](types::Domain) (`types`)
//! - The error taxonomy shared by every layer: [`SimulationError`](types::SimulationError)
//! - Descriptive statistics and the standard normal quantile (`math::statistics`)
//! - The price history collaborator: [`PriceSource`](market_data::PriceSource) and its
//!   CSV and in-memory implementations (`market_data`)
//!
//! ## Zero Dependency Principle
//!
//! mc_core depends on no other mcsim crate. External dependencies are limited to:
//! - chrono: price history date windows
//! - statrs: mean, sample variance and the inverse error function
//! - csv / serde: reading closing-price files
//! - thiserror: error derivations
//!
//! ## Usage Examples
//!
//! ```rust
//! use mc_core::math::statistics::{mean, sample_variance};
//! use mc_core::types::{TrialCount, WorkerCount};
//!
//! let trials = TrialCount::new(1_000).unwrap();
//! let workers = WorkerCount::new(4).unwrap();
//! assert!(workers.validate_against(trials).is_ok());
//!
//! let returns = [0.01, -0.02, 0.03];
//! assert!((mean(&returns) - 0.02 / 3.0).abs() < 1e-12);
//! assert!(sample_variance(&returns) > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
