//! Configuration layering: file, then environment, then flags.

use mc_engine::executor::RemainderPolicy;
use mc_engine::rng::NormalMethod;
use service_cli::config::{build_config_with, CliArgs, ConfigError, LogLevel};
use service_cli::output::OutputFormat;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn no_env(_: &str) -> Option<String> {
    None
}

fn write_config(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("mcsim.toml");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_file_values_fill_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
log_level = "debug"
format = "json"
trials = 5000
remainder = "drop"
normal_method = "ziggurat"
"#,
    );
    let cli = CliArgs {
        config_file: Some(path),
        ..CliArgs::default()
    };

    let config = build_config_with(&cli, no_env).unwrap();

    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.trials, 5_000);
    assert_eq!(config.workers, 4);
    assert_eq!(config.remainder, RemainderPolicy::Drop);
    assert_eq!(config.normal_method, NormalMethod::Ziggurat);
    assert_eq!(config.seed, None);
}

#[test]
fn test_env_beats_file_and_flags_beat_env() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "workers = 3\nseed = 1\n");
    let cli = CliArgs {
        config_file: Some(path),
        seed: Some(99),
        ..CliArgs::default()
    };
    let env = |key: &str| match key {
        "MCSIM_WORKERS" => Some("6".to_string()),
        "MCSIM_SEED" => Some("7".to_string()),
        _ => None,
    };

    let config = build_config_with(&cli, env).unwrap();

    assert_eq!(config.workers, 6);
    assert_eq!(config.seed, Some(99));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let cli = CliArgs {
        config_file: Some(dir.path().join("absent.toml")),
        ..CliArgs::default()
    };

    let err = build_config_with(&cli, no_env).unwrap_err();

    assert!(matches!(err, ConfigError::FileError(_)), "{:?}", err);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "trials = \"many\"\n");
    let cli = CliArgs {
        config_file: Some(path),
        ..CliArgs::default()
    };

    assert!(matches!(
        build_config_with(&cli, no_env),
        Err(ConfigError::FileError(_))
    ));
}

#[test]
fn test_file_values_are_validated() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "trials = 0\n");
    let cli = CliArgs {
        config_file: Some(path),
        ..CliArgs::default()
    };

    assert!(matches!(
        build_config_with(&cli, no_env),
        Err(ConfigError::InvalidValue { name: "trials", .. })
    ));
}
