//! Price source interface and the in-memory implementation.

use crate::types::SimulationError;
use chrono::NaiveDate;
use std::collections::HashMap;

/// A request for daily closing prices of one symbol over an inclusive date range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceHistoryRequest {
    symbol: String,
    start: NaiveDate,
    end: NaiveDate,
}

impl PriceHistoryRequest {
    /// Creates a request.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameters` if the symbol is blank or
    /// `start` is after `end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use mc_core::market_data::PriceHistoryRequest;
    ///
    /// let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    /// let request = PriceHistoryRequest::new("AAPL", start, end).unwrap();
    /// assert_eq!(request.symbol(), "AAPL");
    ///
    /// assert!(PriceHistoryRequest::new("AAPL", end, start).is_err());
    /// ```
    pub fn new(
        symbol: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, SimulationError> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(SimulationError::invalid_parameters(
                "ticker symbol must not be empty",
            ));
        }
        if start > end {
            return Err(SimulationError::invalid_parameters(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { symbol, start, end })
    }

    /// Returns the ticker symbol.
    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the first date of the window.
    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last date of the window.
    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns `true` if `date` falls inside the window.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Orders dated closes ascending, keeps those inside the window and
    /// checks every close is a positive finite number.
    ///
    /// A window without closes yields an empty series.
    pub(crate) fn select(
        &self,
        rows: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Vec<f64>, SimulationError> {
        let mut window: Vec<(NaiveDate, f64)> = rows
            .into_iter()
            .filter(|(date, _)| self.contains(*date))
            .collect();
        window.sort_by_key(|(date, _)| *date);

        if let Some((date, close)) = window
            .iter()
            .find(|(_, close)| !close.is_finite() || *close <= 0.0)
        {
            return Err(SimulationError::upstream(format!(
                "invalid close {} for {} on {}",
                close, self.symbol, date
            )));
        }

        Ok(window.into_iter().map(|(_, close)| close).collect())
    }
}

/// Supplier of historical closing prices.
///
/// Implementations return closes ordered by ascending date, possibly none.
/// They report their own failures as `SimulationError::UpstreamData`; judging
/// whether a series is long enough is left to its consumer.
pub trait PriceSource: Send + Sync {
    /// Fetches the closing prices requested.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::UpstreamData` when the data cannot be
    /// obtained or holds an unusable close.
    fn closing_prices(&self, request: &PriceHistoryRequest) -> Result<Vec<f64>, SimulationError>;
}

/// A price source backed by series held in memory.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use mc_core::market_data::{InMemoryPriceSource, PriceHistoryRequest, PriceSource};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let mut source = InMemoryPriceSource::new();
/// source.insert("ACME", vec![(day(2), 101.0), (day(1), 100.0), (day(3), 99.5)]);
///
/// let request = PriceHistoryRequest::new("ACME", day(1), day(2)).unwrap();
/// assert_eq!(source.closing_prices(&request).unwrap(), vec![100.0, 101.0]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryPriceSource {
    series: HashMap<String, Vec<(NaiveDate, f64)>>,
}

impl InMemoryPriceSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the dated closes for `symbol`.
    pub fn insert(&mut self, symbol: impl Into<String>, closes: Vec<(NaiveDate, f64)>) {
        self.series.insert(symbol.into(), closes);
    }
}

impl PriceSource for InMemoryPriceSource {
    fn closing_prices(&self, request: &PriceHistoryRequest) -> Result<Vec<f64>, SimulationError> {
        let closes = self.series.get(request.symbol()).ok_or_else(|| {
            SimulationError::upstream(format!("unknown symbol {}", request.symbol()))
        })?;
        request.select(closes.iter().copied())
    }
}
