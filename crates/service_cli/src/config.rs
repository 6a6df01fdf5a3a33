//! Command-line configuration management
//!
//! Handles loading configuration from `mcsim.toml`, `MCSIM_*` environment
//! variables, and command-line flags.

use mc_engine::executor::{RemainderPolicy, MAX_WORKERS};
use mc_engine::rng::NormalMethod;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::output::OutputFormat;

/// Configuration file read when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "mcsim.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid remainder policy: {0}. Must be one of: drop, distribute")]
    InvalidRemainder(String),

    #[error("Invalid normal method: {0}. Must be one of: inverse-cdf, ziggurat")]
    InvalidNormalMethod(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Parses a remainder policy name.
pub fn parse_remainder(s: &str) -> Result<RemainderPolicy, ConfigError> {
    match s.to_lowercase().as_str() {
        "drop" => Ok(RemainderPolicy::Drop),
        "distribute" => Ok(RemainderPolicy::Distribute),
        _ => Err(ConfigError::InvalidRemainder(s.to_string())),
    }
}

/// Parses a normal deviate method name.
pub fn parse_normal_method(s: &str) -> Result<NormalMethod, ConfigError> {
    match s.to_lowercase().as_str() {
        "inverse-cdf" | "inverse_cdf" | "icdf" => Ok(NormalMethod::InverseCdf),
        "ziggurat" => Ok(NormalMethod::Ziggurat),
        _ => Err(ConfigError::InvalidNormalMethod(s.to_string())),
    }
}

/// Effective `mcsim` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: LogLevel,
    /// Directory for sample dumps and scaling tables
    pub output_dir: PathBuf,
    /// Output format of command summaries
    pub format: OutputFormat,
    /// Trials per run when a command does not say otherwise
    pub trials: usize,
    /// Workers per run when a command does not say otherwise
    pub workers: usize,
    /// Fixed base seed; runs are unseeded without it
    pub seed: Option<u64>,
    /// Handling of trials that do not divide evenly between workers
    pub remainder: RemainderPolicy,
    /// Normal deviate method
    pub normal_method: NormalMethod,
    /// CSV file of `date,symbol,close` rows for `finance`
    pub price_file: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            output_dir: PathBuf::from("output"),
            format: OutputFormat::Table,
            trials: 10_000_000,
            workers: 4,
            seed: None,
            remainder: RemainderPolicy::default(),
            normal_method: NormalMethod::default(),
            price_file: PathBuf::from("prices.csv"),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Override fields from `MCSIM_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override fields from variables supplied by `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("MCSIM_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(dir) = lookup("MCSIM_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(format) = lookup("MCSIM_FORMAT") {
            self.format = OutputFormat::from_str(&format)
                .map_err(|e| ConfigError::EnvError(format!("MCSIM_FORMAT: {}", e)))?;
        }
        if let Some(trials) = lookup("MCSIM_TRIALS") {
            self.trials = parse_env("MCSIM_TRIALS", &trials)?;
        }
        if let Some(workers) = lookup("MCSIM_WORKERS") {
            self.workers = parse_env("MCSIM_WORKERS", &workers)?;
        }
        if let Some(seed) = lookup("MCSIM_SEED") {
            self.seed = Some(parse_env("MCSIM_SEED", &seed)?);
        }
        if let Some(remainder) = lookup("MCSIM_REMAINDER") {
            self.remainder = parse_remainder(&remainder)?;
        }
        if let Some(method) = lookup("MCSIM_NORMAL_METHOD") {
            self.normal_method = parse_normal_method(&method)?;
        }
        if let Some(file) = lookup("MCSIM_PRICE_FILE") {
            self.price_file = PathBuf::from(file);
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(remainder) = cli.remainder {
            self.remainder = remainder;
        }
        if let Some(method) = cli.normal_method {
            self.normal_method = method;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::InvalidValue {
                name: "trials",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidValue {
                name: "workers",
                reason: format!("must be in [1, {}], got {}", MAX_WORKERS, self.workers),
            });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "output_dir",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::EnvError(format!("{}={}: {}", key, value, e)))
}

/// Global overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<LogLevel>,
    /// Output directory override
    pub output_dir: Option<PathBuf>,
    /// Output format override
    pub format: Option<OutputFormat>,
    /// Seed override
    pub seed: Option<u64>,
    /// Remainder policy override
    pub remainder: Option<RemainderPolicy>,
    /// Normal method override
    pub normal_method: Option<NormalMethod>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file (`--config`, or `mcsim.toml` when present)
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    build_config_with(cli, |key| std::env::var(key).ok())
}

/// [`build_config`] with an explicit environment lookup
pub fn build_config_with<F>(cli: &CliArgs, lookup: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            CliConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => CliConfig::default(),
    };

    config.apply_env_with(lookup)?;
    config.merge_with_cli(cli);
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.trials, 10_000_000);
        assert_eq!(config.workers, 4);
        assert_eq!(config.seed, None);
        assert_eq!(config.remainder, RemainderPolicy::Distribute);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("verbose").is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(parse_remainder("DROP").unwrap(), RemainderPolicy::Drop);
        assert!(parse_remainder("keep").is_err());
        assert_eq!(
            parse_normal_method("ziggurat").unwrap(),
            NormalMethod::Ziggurat
        );
        assert_eq!(
            parse_normal_method("inverse-cdf").unwrap(),
            NormalMethod::InverseCdf
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CliConfig::default();
        config
            .apply_env_with(env(&[
                ("MCSIM_TRIALS", "5000"),
                ("MCSIM_WORKERS", " 8 "),
                ("MCSIM_SEED", "42"),
                ("MCSIM_REMAINDER", "drop"),
                ("MCSIM_FORMAT", "json"),
            ]))
            .unwrap();

        assert_eq!(config.trials, 5_000);
        assert_eq!(config.workers, 8);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.remainder, RemainderPolicy::Drop);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = CliConfig::default();
        let err = config
            .apply_env_with(env(&[("MCSIM_WORKERS", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
        assert!(err.to_string().contains("MCSIM_WORKERS=many"));
    }

    #[test]
    fn test_cli_beats_env() {
        let cli = CliArgs {
            seed: Some(7),
            log_level: Some(LogLevel::Debug),
            ..Default::default()
        };
        let config = build_config_with(&cli, env(&[("MCSIM_SEED", "1")])).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = CliConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                name: "workers",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
            trials = 1000
            remainder = "drop"
            normal_method = "ziggurat"
            log_level = "warn"
            "#,
        )
        .unwrap();
        assert_eq!(config.trials, 1_000);
        assert_eq!(config.remainder, RemainderPolicy::Drop);
        assert_eq!(config.normal_method, NormalMethod::Ziggurat);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.workers, 4);
    }
}
