//! Finance command implementation
//!
//! Simulates future price paths calibrated to a closing-price history read
//! from a CSV file of `date,symbol,close` rows.

use chrono::NaiveDate;
use clap::Args;
use mc_core::market_data::{CsvPriceSource, PriceHistoryRequest};
use mc_engine::kernels::PricePathKernel;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{execute, RunArgs};
use crate::config::CliConfig;
use crate::export::{export_to_file, write_price_paths};
use crate::output::{render, row, Summary};
use crate::Result;

/// Dump file name inside the output directory.
pub const DUMP_FILE: &str = "price_paths.txt";

/// Paths simulated when `--trials` is not given.
pub const DEFAULT_PATHS: usize = 10;

/// Steps per path when `--window` is not given.
pub const DEFAULT_WINDOW: usize = 100;

/// Arguments of `mcsim finance`
#[derive(Args, Debug, Clone)]
pub struct FinanceArgs {
    /// Ticker symbol
    #[arg(short, long)]
    pub symbol: String,

    /// First day of the history (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the history (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    /// Steps per simulated path
    #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Price history CSV (defaults to the configured price file)
    #[arg(long)]
    pub prices: Option<PathBuf>,

    /// One trial is one simulated path
    #[command(flatten)]
    pub run: RunArgs,
}

/// Result of `mcsim finance`
#[derive(Debug, Clone, Serialize)]
pub struct FinanceSummary {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub observations: usize,
    pub start_price: f64,
    pub mean_log_return: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub drift: f64,
    pub window: usize,
    pub workers: usize,
    pub seed: u64,
    pub paths_simulated: usize,
    pub mean_terminal_price: f64,
    pub min_terminal_price: f64,
    pub max_terminal_price: f64,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_file: Option<PathBuf>,
    pub paths: Vec<Vec<f64>>,
}

impl Summary for FinanceSummary {
    fn title(&self) -> String {
        format!(
            "{} paths for {} ({} steps, p = {})",
            self.paths_simulated, self.symbol, self.window, self.workers
        )
    }

    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            row("history", format!("{} to {}", self.start, self.end)),
            row("observations", self.observations),
            row("start_price", format!("{:.4}", self.start_price)),
            row("mean_log_return", format!("{:.7}", self.mean_log_return)),
            row("variance", format!("{:.7}", self.variance)),
            row("drift", format!("{:.7}", self.drift)),
            row("mean_terminal_price", format!("{:.4}", self.mean_terminal_price)),
            row("min_terminal_price", format!("{:.4}", self.min_terminal_price)),
            row("max_terminal_price", format!("{:.4}", self.max_terminal_price)),
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

/// Calibrates a price path kernel to the closes of `symbol` in `price_file`.
pub fn load_kernel(
    price_file: &Path,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    window: usize,
) -> Result<PricePathKernel> {
    info!(
        symbol,
        file = %price_file.display(),
        "loading price history"
    );
    let source = CsvPriceSource::new(price_file);
    let request = PriceHistoryRequest::new(symbol, start, end)?;
    Ok(PricePathKernel::from_source(&source, &request, window)?)
}

/// Run the finance command
pub fn run(args: &FinanceArgs, config: &CliConfig, out: &mut dyn Write) -> Result<FinanceSummary> {
    let price_file = args.prices.as_deref().unwrap_or(config.price_file.as_path());
    let kernel = load_kernel(price_file, &args.symbol, args.start, args.end, args.window)?;
    let stats = kernel.statistics();

    let record = execute(&kernel, &args.run, config, DEFAULT_PATHS)?;
    info!(
        workers = record.workers.get(),
        elapsed = record.elapsed_seconds(),
        "price paths simulated"
    );

    let forecast = record.aggregate();
    let dump_file = if args.run.dump {
        Some(export_to_file(&config.output_dir, DUMP_FILE, |w| {
            write_price_paths(w, &forecast.paths)
        })?)
    } else {
        None
    };

    let terminal = forecast.terminal_prices();
    let summary = FinanceSummary {
        symbol: args.symbol.clone(),
        start: args.start,
        end: args.end,
        observations: kernel.prices().len(),
        start_price: forecast.start_price,
        mean_log_return: stats.mean,
        variance: stats.variance,
        std_dev: stats.std_dev,
        drift: stats.drift,
        window: forecast.window,
        workers: record.workers.get(),
        seed: record.seed,
        paths_simulated: forecast.paths.len(),
        mean_terminal_price: forecast.mean_terminal_price(),
        min_terminal_price: terminal.iter().copied().fold(f64::INFINITY, f64::min),
        max_terminal_price: terminal.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        elapsed_seconds: record.elapsed_seconds(),
        dump_file,
        paths: forecast.paths.clone(),
    };
    render(&summary, config.format, out)?;
    Ok(summary)
}
