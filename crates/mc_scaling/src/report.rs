//! Scaling sweep output.

use crate::config::ScalingMode;
use crate::error::ScalingError;
use crate::laws::{ScalingLaw, SerialFraction};
use serde::Serialize;
use std::io;

/// Header of the CSV scaling table.
pub const CSV_HEADER: [&str; 3] = [
    "number_of_processes",
    "achieved_speedup",
    "theoretical_maximum_speedup",
];

/// Measured and theoretical speedup at one worker count.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScalingRecord {
    /// Workers of the parallel run.
    pub workers: usize,
    /// Trials of both the serial and the parallel run.
    pub trials: usize,
    /// Wall-clock seconds of the serial baseline.
    pub serial_seconds: f64,
    /// Wall-clock seconds of the parallel run.
    pub parallel_seconds: f64,
    /// `serial_seconds / parallel_seconds`.
    pub achieved_speedup: f64,
    /// Speedup predicted by the sweep's law.
    pub theoretical_speedup: f64,
}

impl ScalingRecord {
    /// Builds a record from two measured durations.
    pub fn new(
        workers: usize,
        trials: usize,
        serial_seconds: f64,
        parallel_seconds: f64,
        theoretical_speedup: f64,
    ) -> Self {
        Self {
            workers,
            trials,
            serial_seconds,
            parallel_seconds,
            achieved_speedup: serial_seconds / parallel_seconds,
            theoretical_speedup,
        }
    }

    /// Achieved speedup per worker.
    pub fn efficiency(&self) -> f64 {
        self.achieved_speedup / self.workers as f64
    }

    /// Achieved speedup as a fraction of the theoretical one.
    pub fn attainment(&self) -> f64 {
        self.achieved_speedup / self.theoretical_speedup
    }
}

/// A worker count whose run failed under `FailurePolicy::Continue`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepFailure {
    /// Workers of the failed run.
    pub workers: usize,
    /// Rendered failure.
    pub error: String,
}

/// Result of a full sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScalingReport {
    /// Sweep mode.
    pub mode: ScalingMode,
    /// Law used for `theoretical_speedup`.
    pub law: ScalingLaw,
    /// Serial fraction assumed by the law.
    pub serial_fraction: SerialFraction,
    /// One record per successful worker count, in sweep order.
    pub records: Vec<ScalingRecord>,
    /// Failed worker counts, in sweep order.
    pub failures: Vec<SweepFailure>,
}

#[derive(Serialize)]
struct CsvRow {
    number_of_processes: usize,
    achieved_speedup: f64,
    theoretical_maximum_speedup: f64,
}

impl ScalingReport {
    /// Returns true when every worker count produced a record.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Record with the highest achieved speedup.
    pub fn best(&self) -> Option<&ScalingRecord> {
        self.records
            .iter()
            .max_by(|a, b| a.achieved_speedup.total_cmp(&b.achieved_speedup))
    }

    /// Writes the scaling table as CSV.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mc_scaling::{ScalingLaw, ScalingMode, ScalingRecord, ScalingReport, SerialFraction};
    ///
    /// let report = ScalingReport {
    ///     mode: ScalingMode::Strong,
    ///     law: ScalingLaw::Amdahl,
    ///     serial_fraction: SerialFraction::ZERO,
    ///     records: vec![ScalingRecord::new(2, 1000, 1.0, 0.5, 2.0)],
    ///     failures: Vec::new(),
    /// };
    ///
    /// let mut out = Vec::new();
    /// report.write_csv(&mut out).unwrap();
    /// assert_eq!(
    ///     String::from_utf8(out).unwrap(),
    ///     "number_of_processes,achieved_speedup,theoretical_maximum_speedup\n2,2.0,2.0\n"
    /// );
    /// ```
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), ScalingError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(CSV_HEADER)?;
        for record in &self.records {
            csv.serialize(CsvRow {
                number_of_processes: record.workers,
                achieved_speedup: record.achieved_speedup,
                theoretical_maximum_speedup: record.theoretical_speedup,
            })?;
        }
        csv.flush()?;
        Ok(())
    }
}
