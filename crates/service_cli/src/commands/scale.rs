//! Scale command implementation
//!
//! Sweeps a kernel over a range of worker counts and compares the measured
//! speedup with Amdahl's or Gustafson's law.

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use mc_core::types::TrialCount;
use mc_engine::executor::CancellationToken;
use mc_engine::kernels::{IntegralKernel, PiKernel, SamplingKernel, DEFAULT_GRID_STEP};
use mc_scaling::{
    FailurePolicy, ScalingConfig, ScalingHarness, ScalingLaw, ScalingMode, ScalingRecord,
    ScalingReport, SweepFailure,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use super::executor_config;
use super::finance::{load_kernel, DEFAULT_PATHS, DEFAULT_WINDOW};
use super::integral::Integrand;
use crate::config::CliConfig;
use crate::export::export_to_file;
use crate::output::{render, row, Summary};
use crate::{CliError, Result};

/// Default name of the scaling table inside the output directory.
pub const DEFAULT_CSV_FILE: &str = "scaling.csv";

/// Kernel a sweep measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKernel {
    /// π estimation
    #[default]
    Pi,
    /// Definite integral of the chosen integrand
    Integral,
    /// Price paths calibrated to a closing-price history
    Finance,
}

/// Sweep mode as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    /// Fixed trial count for every worker count
    #[default]
    Strong,
    /// Trial count grows with the worker count
    Weak,
}

impl From<ModeArg> for ScalingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strong => ScalingMode::Strong,
            ModeArg::Weak => ScalingMode::Weak,
        }
    }
}

/// Theoretical law as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LawArg {
    Amdahl,
    Gustafson,
}

impl From<LawArg> for ScalingLaw {
    fn from(law: LawArg) -> Self {
        match law {
            LawArg::Amdahl => ScalingLaw::Amdahl,
            LawArg::Gustafson => ScalingLaw::Gustafson,
        }
    }
}

/// Arguments of `mcsim scale`
#[derive(Args, Debug, Clone)]
pub struct ScaleArgs {
    /// Kernel to sweep
    #[arg(short, long, value_enum, default_value_t = ScaleKernel::Pi)]
    pub kernel: ScaleKernel,

    /// Strong or weak scaling
    #[arg(short, long, value_enum, default_value_t = ModeArg::Strong)]
    pub mode: ModeArg,

    /// Smallest worker count
    #[arg(long, default_value_t = 2)]
    pub from: usize,

    /// Largest worker count
    #[arg(long, default_value_t = 13)]
    pub to: usize,

    /// Trials of the serial baseline (per worker in weak mode); defaults to
    /// the configured trial count, or 10 paths (at least one per worker) for
    /// the finance kernel
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// Serial fraction assumed by the theoretical law
    #[arg(long, default_value_t = 0.0)]
    pub serial_fraction: f64,

    /// Law to compare against (amdahl for strong, gustafson for weak by default)
    #[arg(long, value_enum)]
    pub law: Option<LawArg>,

    /// Record failed worker counts and keep sweeping
    #[arg(long)]
    pub continue_on_failure: bool,

    /// Name of the CSV scaling table inside the output directory
    #[arg(long, default_value = DEFAULT_CSV_FILE)]
    pub csv: String,

    /// Integrand of the integral kernel
    #[arg(short, long, value_enum, default_value_t = Integrand::Linear)]
    pub integrand: Integrand,

    /// Lower integration bound
    #[arg(short = 'a', long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub lower: f64,

    /// Upper integration bound
    #[arg(short = 'b', long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub upper: f64,

    /// Ticker symbol of the finance kernel
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// First day of the finance history (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the finance history (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Steps per simulated path
    #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Price history CSV (defaults to the configured price file)
    #[arg(long)]
    pub prices: Option<PathBuf>,
}

impl Default for ScaleArgs {
    fn default() -> Self {
        Self {
            kernel: ScaleKernel::Pi,
            mode: ModeArg::Strong,
            from: 2,
            to: 13,
            trials: None,
            serial_fraction: 0.0,
            law: None,
            continue_on_failure: false,
            csv: DEFAULT_CSV_FILE.to_string(),
            integrand: Integrand::Linear,
            lower: 1.0,
            upper: 2.0,
            symbol: None,
            start: None,
            end: None,
            window: DEFAULT_WINDOW,
            prices: None,
        }
    }
}

/// Result of `mcsim scale`
#[derive(Debug, Clone, Serialize)]
pub struct ScaleSummary {
    pub kernel: ScaleKernel,
    pub base_trials: usize,
    #[serde(flatten)]
    pub report: ScalingReport,
    pub csv_file: PathBuf,
}

impl Summary for ScaleSummary {
    fn title(&self) -> String {
        format!(
            "{:?} scaling of {:?} (n = {}, {}, s = {})",
            self.report.mode,
            self.kernel,
            self.base_trials,
            self.report.law,
            self.report.serial_fraction.get()
        )
    }

    fn rows(&self) -> Vec<(String, String)> {
        let mut rows: Vec<(String, String)> = self
            .report
            .records
            .iter()
            .map(|record: &ScalingRecord| {
                row(
                    &format!("P = {}", record.workers),
                    format!(
                        "{:.3}x of {:.3}x ({:.1}%)",
                        record.achieved_speedup,
                        record.theoretical_speedup,
                        record.attainment() * 100.0
                    ),
                )
            })
            .collect();
        rows.extend(self.report.failures.iter().map(|failure: &SweepFailure| {
            row(&format!("P = {}", failure.workers), format!("failed: {}", failure.error))
        }));
        rows.push(row("csv_file", self.csv_file.display()));
        rows
    }
}

/// Run the scale command
pub fn run(args: &ScaleArgs, config: &CliConfig, out: &mut dyn Write) -> Result<ScaleSummary> {
    let default_trials = match args.kernel {
        // Every worker of a strong sweep needs at least one path.
        ScaleKernel::Finance => DEFAULT_PATHS.max(args.to),
        ScaleKernel::Pi | ScaleKernel::Integral => config.trials,
    };
    let base_trials = TrialCount::new(args.trials.unwrap_or(default_trials))?;
    if matches!(args.mode, ModeArg::Strong) && args.to > base_trials.get() {
        return Err(CliError::InvalidArgument(format!(
            "a strong sweep up to {} workers needs at least {} trials, got {}",
            args.to,
            args.to,
            base_trials.get()
        )));
    }
    let mut builder = ScalingConfig::builder()
        .mode(args.mode.into())
        .base_trials(base_trials)
        .worker_counts(args.from..=args.to)
        .serial_fraction(args.serial_fraction)
        .failure_policy(if args.continue_on_failure {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        })
        .executor(executor_config(config)?);
    if let Some(law) = args.law {
        builder = builder.law(law.into());
    }
    let harness = ScalingHarness::new(builder.build()?);

    let report = match args.kernel {
        ScaleKernel::Pi => sweep(&harness, &PiKernel::new())?,
        ScaleKernel::Integral => {
            let integrand = args.integrand;
            let kernel = IntegralKernel::with_grid_step(
                move |x: f64| integrand.evaluate(x),
                args.lower,
                args.upper,
                DEFAULT_GRID_STEP,
            )?;
            sweep(&harness, &kernel)?
        }
        ScaleKernel::Finance => {
            let missing = |flag: &str| {
                CliError::InvalidArgument(format!("{} is required to sweep finance", flag))
            };
            let symbol = args.symbol.as_deref().ok_or_else(|| missing("--symbol"))?;
            let start = args.start.ok_or_else(|| missing("--start"))?;
            let end = args.end.ok_or_else(|| missing("--end"))?;
            let price_file = args.prices.as_deref().unwrap_or(config.price_file.as_path());
            let kernel = load_kernel(price_file, symbol, start, end, args.window)?;
            sweep(&harness, &kernel)?
        }
    };
    if !report.is_complete() {
        warn!(failures = report.failures.len(), "sweep finished with failures");
    }

    let mut table = Vec::new();
    report.write_csv(&mut table)?;
    let csv_file = export_to_file(&config.output_dir, &args.csv, |w| w.write_all(&table))?;

    let summary = ScaleSummary {
        kernel: args.kernel,
        base_trials: base_trials.get(),
        report,
        csv_file,
    };
    render(&summary, config.format, out)?;
    Ok(summary)
}

fn sweep<K: SamplingKernel>(harness: &ScalingHarness, kernel: &K) -> Result<ScalingReport> {
    let report = harness.run(kernel, &CancellationToken::new())?;
    if let Some(best) = report.best() {
        info!(
            workers = best.workers,
            speedup = best.achieved_speedup,
            "best speedup"
        );
    }
    Ok(report)
}
