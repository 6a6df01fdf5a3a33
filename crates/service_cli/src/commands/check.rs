//! Check command implementation
//!
//! Reports the machine's CPU counts and the effective configuration.

use serde::Serialize;
use std::io::Write;
use tracing::warn;

use crate::config::CliConfig;
use crate::output::{render, row, Summary};
use crate::{Result, VERSION};

/// Result of `mcsim check`
#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    pub version: &'static str,
    pub logical_cpus: usize,
    pub physical_cpus: usize,
    pub config: CliConfig,
}

impl Summary for CheckSummary {
    fn title(&self) -> String {
        format!("mcsim {}", self.version)
    }

    fn rows(&self) -> Vec<(String, String)> {
        let config = &self.config;
        vec![
            row("logical_cpus", self.logical_cpus),
            row("physical_cpus", self.physical_cpus),
            row("workers", config.workers),
            row("trials", config.trials),
            row(
                "seed",
                config
                    .seed
                    .map_or_else(|| "entropy".to_string(), |seed| seed.to_string()),
            ),
            row("remainder", format!("{:?}", config.remainder)),
            row("normal_method", format!("{:?}", config.normal_method)),
            row("log_level", config.log_level),
            row("output_dir", config.output_dir.display()),
            row("price_file", config.price_file.display()),
        ]
    }
}

/// Run the check command
pub fn run(config: &CliConfig, out: &mut dyn Write) -> Result<CheckSummary> {
    let summary = CheckSummary {
        version: VERSION,
        logical_cpus: num_cpus::get(),
        physical_cpus: num_cpus::get_physical(),
        config: config.clone(),
    };
    if config.workers > summary.logical_cpus {
        warn!(
            workers = config.workers,
            logical_cpus = summary.logical_cpus,
            "configured workers exceed logical CPUs"
        );
    }
    if !config.price_file.exists() {
        warn!(path = %config.price_file.display(), "price file not found");
    }
    render(&summary, config.format, out)?;
    Ok(summary)
}
