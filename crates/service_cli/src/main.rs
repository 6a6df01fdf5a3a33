//! mcsim - parallel Monte Carlo estimation from the command line
//!
//! # Commands
//!
//! - `mcsim pi` - Estimate π
//! - `mcsim integral` - Estimate a definite integral
//! - `mcsim finance --symbol <s> --start <d> --end <d>` - Simulate price paths
//! - `mcsim scale` - Run a scaling sweep and write the CSV table
//! - `mcsim check` - Show CPU counts and the effective configuration

use anyhow::Context;
use clap::{Parser, Subcommand};
use mc_engine::executor::RemainderPolicy;
use mc_engine::rng::NormalMethod;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use service_cli::commands::{check, finance, integral, pi, scale};
use service_cli::config::{build_config, parse_normal_method, parse_remainder, CliArgs, LogLevel};
use service_cli::output::OutputFormat;

/// Parallel Monte Carlo estimation and scaling analysis
#[derive(Parser)]
#[command(name = "mcsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./mcsim.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Directory for sample dumps and scaling tables
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Summary format
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Base seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Remainder policy (drop, distribute)
    #[arg(long, global = true, value_parser = parse_remainder)]
    remainder: Option<RemainderPolicy>,

    /// Normal deviate method (inverse-cdf, ziggurat)
    #[arg(long, global = true, value_parser = parse_normal_method)]
    normal_method: Option<NormalMethod>,

    #[command(subcommand)]
    command: Commands,
}

impl From<&Cli> for CliArgs {
    fn from(cli: &Cli) -> Self {
        Self {
            config_file: cli.config.clone(),
            log_level: cli.log_level,
            output_dir: cli.output_dir.clone(),
            format: cli.format,
            seed: cli.seed,
            remainder: cli.remainder,
            normal_method: cli.normal_method,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate π by sampling the unit square
    Pi(pi::PiArgs),

    /// Estimate a definite integral by hit-or-miss sampling
    Integral(integral::IntegralArgs),

    /// Simulate price paths from a closing-price history
    Finance(finance::FinanceArgs),

    /// Measure speedup over a range of worker counts
    Scale(scale::ScaleArgs),

    /// Show CPU counts and the effective configuration
    Check,
}

fn init_tracing(log_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&CliArgs::from(&cli)).context("failed to load configuration")?;

    init_tracing(config.log_level);
    info!(version = service_cli::VERSION, "mcsim starting");
    debug!(?config, "effective configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::Pi(args) => {
            pi::run(args, &config, &mut out).context("pi estimation failed")?;
        }
        Commands::Integral(args) => {
            integral::run(args, &config, &mut out).context("integral estimation failed")?;
        }
        Commands::Finance(args) => {
            finance::run(args, &config, &mut out).context("price path simulation failed")?;
        }
        Commands::Scale(args) => {
            scale::run(args, &config, &mut out).context("scaling sweep failed")?;
        }
        Commands::Check => {
            check::run(&config, &mut out).context("check failed")?;
        }
    }
    out.flush()?;
    Ok(())
}
