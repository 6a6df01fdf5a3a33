//! Historical price data for the price path kernel.
//!
//! The kernel never talks to a market data vendor directly. It receives an
//! ordered series of closing prices from a [`PriceSource`]. Source failures
//! surface as
//! [`SimulationError::UpstreamData`](crate::types::SimulationError::UpstreamData)
//! and are never retried. A source may also return an empty or short series;
//! the kernel rejects those as
//! [`SimulationError::InvalidParameters`](crate::types::SimulationError::InvalidParameters).
//!
//! ## Implementations
//!
//! - [`CsvPriceSource`]: `date,symbol,close` rows from a file on disk
//! - [`InMemoryPriceSource`]: fixed series, mainly for tests and demos

mod csv_source;
mod price_source;

pub use csv_source::CsvPriceSource;
pub use price_source::{InMemoryPriceSource, PriceHistoryRequest, PriceSource};
