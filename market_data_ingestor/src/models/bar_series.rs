//! A collection of time-series bars for a specific pair and timeframe.

use serde::Serialize;

use crate::models::{bar::Bar, pair::TradingPair, timeframe::TimeFrame};

/// Where the bars of a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesSource {
    /// Live history from the exchange.
    Exchange,
    /// Random-walk fallback data.
    Synthetic,
}

/// Represents a complete set of time-series data for a single pair.
///
/// Bars are ordered by timestamp, ascending, with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    /// The pair this data represents (e.g., "BTC/USDT").
    pub pair: TradingPair,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// Provenance of the bars.
    pub source: SeriesSource,
    /// The collection of OHLCV bars.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
