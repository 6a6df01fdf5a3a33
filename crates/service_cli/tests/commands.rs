//! End-to-end tests of the `mcsim` commands.
//!
//! Every command writes its summary into a buffer as JSON and its files into
//! a temporary output directory.

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use service_cli::commands::finance::FinanceArgs;
use service_cli::commands::integral::{Integrand, IntegralArgs};
use service_cli::commands::pi::PiArgs;
use service_cli::commands::scale::{ModeArg, ScaleArgs, ScaleKernel};
use service_cli::commands::{check, finance, integral, pi, scale, RunArgs};
use service_cli::config::CliConfig;
use service_cli::output::OutputFormat;
use service_cli::CliError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config(dir: &Path) -> CliConfig {
    CliConfig {
        output_dir: dir.join("out"),
        format: OutputFormat::Json,
        trials: 200_000,
        workers: 2,
        seed: Some(42),
        price_file: dir.join("prices.csv"),
        ..CliConfig::default()
    }
}

fn run_args(trials: usize, workers: usize) -> RunArgs {
    RunArgs {
        trials: Some(trials),
        workers: Some(workers),
        serial: false,
        dump: false,
    }
}

fn json(out: &[u8]) -> serde_json::Value {
    serde_json::from_slice(out).unwrap()
}

#[test]
fn test_pi_estimate_and_json_output() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let mut out = Vec::new();

    let summary = pi::run(&PiArgs::default(), &config, &mut out).unwrap();

    assert_eq!(summary.trials_executed, 200_000);
    assert_eq!(summary.workers, 2);
    assert_abs_diff_eq!(summary.estimate, std::f64::consts::PI, epsilon = 0.05);
    let value = json(&out);
    assert_eq!(value["trials_executed"], 200_000);
    assert!(value.get("dump_file").is_none());
}

#[test]
fn test_pi_seeded_runs_repeat() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = PiArgs {
        run: run_args(50_000, 3),
    };

    let first = pi::run(&args, &config, &mut Vec::new()).unwrap();
    let second = pi::run(&args, &config, &mut Vec::new()).unwrap();

    assert_eq!(first.seed, 42);
    assert_eq!(first.inside, second.inside);
}

#[test]
fn test_pi_dump_writes_pixel_coordinates() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = PiArgs {
        run: RunArgs {
            dump: true,
            ..run_args(1_000, 2)
        },
    };

    let summary = pi::run(&args, &config, &mut Vec::new()).unwrap();

    let path = summary.dump_file.unwrap();
    assert_eq!(path, config.output_dir.join(pi::DUMP_FILE));
    let text = fs::read_to_string(path).unwrap();
    assert_eq!(text.lines().count(), 1_000);
    for line in text.lines() {
        let coords: Vec<i64> = line.split(' ').map(|c| c.parse().unwrap()).collect();
        assert_eq!(coords.len(), 2);
        assert!(coords.iter().all(|c| (0..=500).contains(c)), "{}", line);
    }
}

#[test]
fn test_pi_drop_remainder_executes_fewer_trials() {
    let dir = TempDir::new().unwrap();
    let config = CliConfig {
        remainder: mc_engine::executor::RemainderPolicy::Drop,
        ..config(dir.path())
    };
    let args = PiArgs {
        run: run_args(10_003, 4),
    };

    let summary = pi::run(&args, &config, &mut Vec::new()).unwrap();

    assert_eq!(summary.trials_requested, 10_003);
    assert_eq!(summary.trials_executed, 10_000);
}

#[test]
fn test_integral_linear_serial() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = IntegralArgs {
        run: RunArgs {
            serial: true,
            ..run_args(200_000, 1)
        },
        ..IntegralArgs::default()
    };

    let summary = integral::run(&args, &config, &mut Vec::new()).unwrap();

    assert_eq!(summary.workers, 1);
    assert_abs_diff_eq!(summary.exact, 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(summary.estimate, 3.0, epsilon = 0.05);
    assert_abs_diff_eq!(summary.f_max, 3.98, epsilon = 1e-9);
}

#[test]
fn test_integral_quadratic_dump() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = IntegralArgs {
        integrand: Integrand::Quadratic,
        lower: 0.0,
        upper: 3.0,
        run: RunArgs {
            dump: true,
            ..run_args(500, 2)
        },
        ..IntegralArgs::default()
    };

    let summary = integral::run(&args, &config, &mut Vec::new()).unwrap();

    let text = fs::read_to_string(summary.dump_file.unwrap()).unwrap();
    assert_eq!(text.lines().count(), 500);
    let first = text.lines().next().unwrap();
    let fields: Vec<&str> = first.split(' ').collect();
    assert_eq!(fields.len(), 2);
    assert!(fields.iter().all(|f| f.split('.').nth(1).map(str::len) == Some(2)));
}

#[test]
fn test_integral_rejects_reversed_bounds() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = IntegralArgs {
        lower: 2.0,
        upper: 1.0,
        ..IntegralArgs::default()
    };

    let err = integral::run(&args, &config, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, CliError::Simulation(_)), "{:?}", err);
}

#[test]
fn test_zero_trials_rejected() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = PiArgs {
        run: run_args(0, 2),
    };

    assert!(pi::run(&args, &config, &mut Vec::new()).is_err());
}

fn write_prices(path: &Path) {
    let mut text = String::from("date,symbol,close\n");
    for (day, close) in [100.0, 101.0, 99.5, 102.0, 103.5].iter().enumerate() {
        text.push_str(&format!("2024-01-{:02},AAA,{}\n", day + 1, close));
    }
    text.push_str("2024-01-03,BBB,10.0\n");
    fs::write(path, text).unwrap();
}

fn finance_args(symbol: &str) -> FinanceArgs {
    FinanceArgs {
        symbol: symbol.to_string(),
        start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        window: 5,
        prices: None,
        run: run_args(4, 2),
    }
}

#[test]
fn test_finance_paths_from_csv() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_prices(&config.price_file);
    let args = FinanceArgs {
        run: RunArgs {
            dump: true,
            ..run_args(4, 2)
        },
        ..finance_args("AAA")
    };

    let summary = finance::run(&args, &config, &mut Vec::new()).unwrap();

    assert_eq!(summary.observations, 5);
    assert_abs_diff_eq!(summary.start_price, 103.5);
    assert_eq!(summary.paths.len(), 4);
    assert!(summary.paths.iter().all(|p| p.len() == 6 && p[0] == 103.5));

    let text = fs::read_to_string(summary.dump_file.unwrap()).unwrap();
    let serials: Vec<&str> = text
        .lines()
        .map(|l| l.split(", ").next().unwrap())
        .collect();
    assert_eq!(serials, ["1", "2", "3", "4"]);
    assert!(text.lines().all(|l| l.split(", ").count() == 7));
}

#[test]
fn test_finance_too_few_prices() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_prices(&config.price_file);

    let err = finance::run(&finance_args("BBB"), &config, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, CliError::Simulation(_)), "{:?}", err);
}

#[test]
fn test_finance_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());

    let err = finance::run(&finance_args("AAA"), &config, &mut Vec::new()).unwrap_err();

    assert!(err.to_string().contains("prices.csv"), "{}", err);
}

#[test]
fn test_scale_writes_csv_table() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = ScaleArgs {
        from: 1,
        to: 3,
        trials: Some(20_000),
        ..ScaleArgs::default()
    };
    let mut out = Vec::new();

    let summary = scale::run(&args, &config, &mut out).unwrap();

    assert_eq!(summary.report.records.len(), 3);
    assert!(summary.report.is_complete());
    let text = fs::read_to_string(&summary.csv_file).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "number_of_processes,achieved_speedup,theoretical_maximum_speedup"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("1,"));

    let value = json(&out);
    assert_eq!(value["mode"], "strong");
    assert_eq!(value["records"].as_array().unwrap().len(), 3);
}

#[test]
fn test_scale_weak_integral() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = ScaleArgs {
        kernel: ScaleKernel::Integral,
        mode: ModeArg::Weak,
        from: 1,
        to: 2,
        trials: Some(5_000),
        csv: "weak.csv".to_string(),
        ..ScaleArgs::default()
    };

    let summary = scale::run(&args, &config, &mut Vec::new()).unwrap();

    let trials: Vec<usize> = summary.report.records.iter().map(|r| r.trials).collect();
    assert_eq!(trials, [5_000, 10_000]);
    assert_eq!(summary.report.law, mc_scaling::ScalingLaw::Gustafson);
    assert!(summary.csv_file.ends_with("weak.csv"));
}

#[test]
fn test_scale_rejects_empty_range() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = ScaleArgs {
        from: 5,
        to: 4,
        ..ScaleArgs::default()
    };

    let err = scale::run(&args, &config, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, CliError::Scaling(_)), "{:?}", err);
}

fn finance_scale_args(dir: &Path) -> ScaleArgs {
    ScaleArgs {
        kernel: ScaleKernel::Finance,
        from: 1,
        to: 3,
        symbol: Some("AAA".to_string()),
        start: NaiveDate::from_ymd_opt(2024, 1, 1),
        end: NaiveDate::from_ymd_opt(2024, 1, 31),
        window: 5,
        prices: Some(dir.join("history.csv")),
        csv: "finance.csv".to_string(),
        ..ScaleArgs::default()
    }
}

#[test]
fn test_scale_finance_strong_and_weak() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_prices(&dir.path().join("history.csv"));

    let strong = scale::run(&finance_scale_args(dir.path()), &config, &mut Vec::new()).unwrap();

    assert_eq!(strong.kernel, ScaleKernel::Finance);
    assert_eq!(strong.base_trials, 10);
    let workers: Vec<usize> = strong.report.records.iter().map(|r| r.workers).collect();
    assert_eq!(workers, [1, 2, 3]);
    assert!(strong.report.records.iter().all(|r| r.trials == 10));
    let text = fs::read_to_string(&strong.csv_file).unwrap();
    assert!(text.starts_with("number_of_processes,achieved_speedup,theoretical_maximum_speedup\n"));
    assert_eq!(text.lines().count(), 4);

    let weak_args = ScaleArgs {
        mode: ModeArg::Weak,
        trials: Some(4),
        ..finance_scale_args(dir.path())
    };
    let weak = scale::run(&weak_args, &config, &mut Vec::new()).unwrap();

    let trials: Vec<usize> = weak.report.records.iter().map(|r| r.trials).collect();
    assert_eq!(trials, [4, 8, 12]);
}

#[test]
fn test_scale_finance_defaults_to_one_path_per_worker() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_prices(&dir.path().join("history.csv"));
    let args = ScaleArgs {
        from: 11,
        to: 12,
        ..finance_scale_args(dir.path())
    };

    let summary = scale::run(&args, &config, &mut Vec::new()).unwrap();

    assert_eq!(summary.base_trials, 12);
    assert!(summary.report.is_complete());
}

#[test]
fn test_scale_finance_needs_history_flags() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_prices(&dir.path().join("history.csv"));
    let args = ScaleArgs {
        symbol: None,
        ..finance_scale_args(dir.path())
    };

    let err = scale::run(&args, &config, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgument(_)), "{:?}", err);
    assert!(err.to_string().contains("--symbol"));
}

#[test]
fn test_scale_finance_rejects_short_history() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_prices(&dir.path().join("history.csv"));
    let args = ScaleArgs {
        start: NaiveDate::from_ymd_opt(2023, 1, 1),
        end: NaiveDate::from_ymd_opt(2023, 12, 31),
        ..finance_scale_args(dir.path())
    };

    let err = scale::run(&args, &config, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, CliError::Simulation(_)), "{:?}", err);
}

#[test]
fn test_scale_strong_needs_a_trial_per_worker() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let args = ScaleArgs {
        from: 2,
        to: 8,
        trials: Some(5),
        ..ScaleArgs::default()
    };

    let err = scale::run(&args, &config, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgument(_)), "{:?}", err);
}

#[test]
fn test_check_reports_cpus_and_config() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let mut out = Vec::new();

    let summary = check::run(&config, &mut out).unwrap();

    assert!(summary.logical_cpus >= 1);
    let value = json(&out);
    assert_eq!(value["version"], service_cli::VERSION);
    assert_eq!(value["config"]["workers"], 2);
    assert_eq!(value["config"]["seed"], 42);
}

#[test]
fn test_table_output() {
    let dir = TempDir::new().unwrap();
    let config = CliConfig {
        format: OutputFormat::Table,
        ..config(dir.path())
    };
    let mut out = Vec::new();

    pi::run(&PiArgs { run: run_args(1_000, 2) }, &config, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with('┌'));
    assert!(text.contains("estimate"));
}
