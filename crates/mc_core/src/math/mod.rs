//! Numerical helpers shared by the sampling kernels.
//!
//! - [`statistics`]: mean, sample variance and the standard normal quantile

pub mod statistics;
