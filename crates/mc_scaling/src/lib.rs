//! # mc_scaling: Parallel Efficiency Analysis
//!
//! Drives the executors of `mc_engine` over a sweep of worker counts and
//! compares the measured speedup `T_serial / T_parallel(P)` with a
//! theoretical bound.
//!
//! ## Sweep Modes
//!
//! | Mode | Serial runs | Parallel run at `P` | Default law |
//! |------|-------------|---------------------|-------------|
//! | Strong | once, at `base` trials | `base` trials | Amdahl |
//! | Weak | per `P`, at `base · P` trials | `base · P` trials | Gustafson |
//!
//! ## Usage Example
//!
//! ```rust
//! use mc_core::types::TrialCount;
//! use mc_engine::executor::CancellationToken;
//! use mc_engine::kernels::PiKernel;
//! use mc_scaling::{ScalingConfig, ScalingHarness, ScalingMode};
//!
//! let config = ScalingConfig::builder()
//!     .mode(ScalingMode::Strong)
//!     .base_trials(TrialCount::new(100_000).unwrap())
//!     .worker_counts(2..=3)
//!     .build()
//!     .unwrap();
//!
//! let report = ScalingHarness::new(config)
//!     .run(&PiKernel::new(), &CancellationToken::new())
//!     .unwrap();
//!
//! assert_eq!(report.records.len(), 2);
//! assert_eq!(report.records[0].theoretical_speedup, 2.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod config;
mod error;
mod harness;
mod laws;
mod report;

pub use config::{FailurePolicy, ScalingConfig, ScalingConfigBuilder, ScalingMode, DEFAULT_WORKER_COUNTS};
pub use error::ScalingError;
pub use harness::ScalingHarness;
pub use laws::{amdahl_speedup, gustafson_speedup, ScalingLaw, SerialFraction};
pub use report::{ScalingRecord, ScalingReport, SweepFailure, CSV_HEADER};
