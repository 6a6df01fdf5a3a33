//! Closing prices read from a CSV file.
//!
//! Expected layout, one row per trading day and symbol:
//!
//! ```text
//! date,symbol,close
//! 2019-12-30,AAPL,72.88
//! 2019-12-31,AAPL,73.41
//! ```

use super::price_source::{PriceHistoryRequest, PriceSource};
use crate::types::SimulationError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    symbol: String,
    close: f64,
}

/// A price source reading `date,symbol,close` rows from disk.
///
/// The file is re-read on every request, so edits between runs are picked up.
#[derive(Clone, Debug)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    /// Creates a source for the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSource for CsvPriceSource {
    fn closing_prices(&self, request: &PriceHistoryRequest) -> Result<Vec<f64>, SimulationError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| {
                SimulationError::upstream(format!(
                    "cannot open price file {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        let mut rows = Vec::new();
        for (index, record) in reader.deserialize::<PriceRow>().enumerate() {
            let row = record.map_err(|e| {
                SimulationError::upstream(format!(
                    "malformed row {} in {}: {}",
                    index + 1,
                    self.path.display(),
                    e
                ))
            })?;
            if row.symbol.eq_ignore_ascii_case(request.symbol()) {
                rows.push((row.date, row.close));
            }
        }

        request.select(rows)
    }
}
