use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{pair::TradingPair, timeframe::TimeFrame};

/// Parameters for one page of bar data from a market data provider.
///
/// This is the whole contract of the provider boundary: the history fetcher
/// drives paging by moving `since` forward between calls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Pair to request (e.g., `BTC/USDT`).
    pub pair: TradingPair,

    /// The interval of each bar.
    pub timeframe: TimeFrame,

    /// Inclusive lower bound on the bar open time (UTC).
    ///
    /// Providers should return bars opening at or after this timestamp,
    /// oldest first.
    pub since: DateTime<Utc>,

    /// Maximum number of bars in the returned page.
    pub limit: u32,
}
