//! # service_cli: the `mcsim` command line
//!
//! As the service layer of the mcsim workspace, this crate wires the engine
//! and the scaling harness to a command line:
//!
//! - `mcsim pi` estimates π
//! - `mcsim integral` estimates a definite integral of a catalogue integrand
//! - `mcsim finance` simulates price paths calibrated to a CSV price history
//! - `mcsim scale` runs a strong or weak scaling sweep and writes the CSV table
//! - `mcsim check` reports the machine and the effective configuration
//!
//! Configuration is layered: defaults, then `mcsim.toml`, then `MCSIM_*`
//! environment variables, then command-line flags.

pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod output;

pub use error::{CliError, Result};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
