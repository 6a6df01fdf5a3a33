//! Integral command implementation
//!
//! Estimates `∫ₐᵇ f(x) dx` for an integrand from a small catalogue.

use clap::{Args, ValueEnum};
use mc_engine::kernels::{IntegralKernel, DEFAULT_GRID_STEP};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::{execute, RunArgs};
use crate::config::CliConfig;
use crate::export::{export_to_file, write_integral_samples};
use crate::output::{render, row, Summary};
use crate::Result;

/// Dump file name inside the output directory.
pub const DUMP_FILE: &str = "integral_samples.txt";

/// Integrands available on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integrand {
    /// f(x) = 2x
    #[default]
    Linear,
    /// f(x) = x²
    Quadratic,
    /// f(x) = sin x + 1
    Sine,
    /// f(x) = eˣ
    Exponential,
}

impl Integrand {
    /// Evaluates the integrand.
    pub fn evaluate(self, x: f64) -> f64 {
        match self {
            Integrand::Linear => 2.0 * x,
            Integrand::Quadratic => x * x,
            Integrand::Sine => x.sin() + 1.0,
            Integrand::Exponential => x.exp(),
        }
    }

    /// Closed-form `∫ₐᵇ f(x) dx`.
    pub fn exact(self, lower: f64, upper: f64) -> f64 {
        let antiderivative = |x: f64| match self {
            Integrand::Linear => x * x,
            Integrand::Quadratic => x * x * x / 3.0,
            Integrand::Sine => x - x.cos(),
            Integrand::Exponential => x.exp(),
        };
        antiderivative(upper) - antiderivative(lower)
    }

    /// Human-readable formula.
    pub fn formula(self) -> &'static str {
        match self {
            Integrand::Linear => "2x",
            Integrand::Quadratic => "x^2",
            Integrand::Sine => "sin(x) + 1",
            Integrand::Exponential => "e^x",
        }
    }
}

/// Arguments of `mcsim integral`
#[derive(Args, Debug, Clone)]
pub struct IntegralArgs {
    /// Integrand
    #[arg(short, long, value_enum, default_value_t = Integrand::Linear)]
    pub integrand: Integrand,

    /// Lower integration bound
    #[arg(short = 'a', long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub lower: f64,

    /// Upper integration bound
    #[arg(short = 'b', long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub upper: f64,

    /// Spacing of the grid that bounds the integrand
    #[arg(long, default_value_t = DEFAULT_GRID_STEP)]
    pub grid_step: f64,

    #[command(flatten)]
    pub run: RunArgs,
}

impl Default for IntegralArgs {
    fn default() -> Self {
        Self {
            integrand: Integrand::Linear,
            lower: 1.0,
            upper: 2.0,
            grid_step: DEFAULT_GRID_STEP,
            run: RunArgs::default(),
        }
    }
}

/// Result of `mcsim integral`
#[derive(Debug, Clone, Serialize)]
pub struct IntegralSummary {
    pub integrand: Integrand,
    pub lower: f64,
    pub upper: f64,
    pub f_max: f64,
    pub workers: usize,
    pub seed: u64,
    pub trials_requested: usize,
    pub trials_executed: usize,
    pub below: u64,
    pub estimate: f64,
    pub exact: f64,
    pub abs_error: f64,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_file: Option<PathBuf>,
}

impl Summary for IntegralSummary {
    fn title(&self) -> String {
        format!(
            "∫ {} dx over [{}, {}] (n = {}, p = {})",
            self.integrand.formula(),
            self.lower,
            self.upper,
            self.trials_executed,
            self.workers
        )
    }

    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            row("estimate", format!("{:.8}", self.estimate)),
            row("exact", format!("{:.8}", self.exact)),
            row("abs_error", format!("{:.3e}", self.abs_error)),
            row("f_max", format!("{:.6}", self.f_max)),
            row("below", self.below),
            row("trials_executed", self.trials_executed),
            row("workers", self.workers),
            row("seed", self.seed),
            row("elapsed_seconds", format!("{:.6}", self.elapsed_seconds)),
        ];
        if let Some(path) = &self.dump_file {
            rows.push(row("dump_file", path.display()));
        }
        rows
    }
}

/// Run the integral command
pub fn run(args: &IntegralArgs, config: &CliConfig, out: &mut dyn Write) -> Result<IntegralSummary> {
    let integrand = args.integrand;
    let kernel = IntegralKernel::with_grid_step(
        move |x: f64| integrand.evaluate(x),
        args.lower,
        args.upper,
        args.grid_step,
    )?
    .with_sample_capture(args.run.dump);

    let record = execute(&kernel, &args.run, config, config.trials)?;
    info!(
        integrand = integrand.formula(),
        workers = record.workers.get(),
        elapsed = record.elapsed_seconds(),
        "integral estimated"
    );

    let estimate = record.aggregate();
    let dump_file = if args.run.dump {
        Some(export_to_file(&config.output_dir, DUMP_FILE, |w| {
            write_integral_samples(w, &estimate.samples)
        })?)
    } else {
        None
    };

    let exact = integrand.exact(args.lower, args.upper);
    let summary = IntegralSummary {
        integrand,
        lower: args.lower,
        upper: args.upper,
        f_max: estimate.f_max,
        workers: record.workers.get(),
        seed: record.seed,
        trials_requested: record.trials_requested,
        trials_executed: record.trials_executed,
        below: estimate.below,
        estimate: estimate.estimate,
        exact,
        abs_error: (estimate.estimate - exact).abs(),
        elapsed_seconds: record.elapsed_seconds(),
        dump_file,
    };
    render(&summary, config.format, out)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_exact_values() {
        assert_relative_eq!(Integrand::Linear.exact(1.0, 2.0), 3.0);
        assert_relative_eq!(Integrand::Quadratic.exact(0.0, 3.0), 9.0);
        assert_relative_eq!(Integrand::Sine.exact(0.0, PI), PI + 2.0, epsilon = 1e-12);
        assert_relative_eq!(Integrand::Exponential.exact(0.0, 1.0), std::f64::consts::E - 1.0);
    }

    #[test]
    fn test_integrands_non_negative_on_defaults() {
        for integrand in Integrand::value_variants() {
            assert!(integrand.evaluate(1.0) >= 0.0);
            assert!(integrand.evaluate(2.0) >= 0.0);
        }
    }
}
