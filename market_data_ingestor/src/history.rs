//! Bounded history retrieval with a synthetic fallback.
//!
//! [`HistoryFetcher::fetch`] pages a [`DataProvider`] forward from
//! `now - lookback`, trims the buffer to a random contiguous window when it
//! overshoots the requested size, and on any provider failure returns
//! synthetic bars instead. It never returns an error.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;
use snafu::ResultExt;
use tracing::{debug, info, warn};

use crate::{
    models::{
        bar::Bar,
        bar_series::{BarSeries, SeriesSource},
        pair::TradingPair,
        request_params::PageRequest,
        timeframe::TimeFrame,
    },
    providers::{DataProvider, ProviderError, TimeoutSnafu, binance_rest::MAX_PAGE_LIMIT},
    synthetic,
};

/// Knobs of the paging loop and the fallback.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// How far back the first page starts.
    pub lookback: Duration,
    /// Bars requested per page.
    pub page_limit: u32,
    /// Upper bound on one whole paging run.
    pub deadline: StdDuration,
    /// First timestamp of synthetic fallback data.
    pub fallback_start: DateTime<Utc>,
}

/// Start of the synthetic fallback series: 2025-04-05 00:00:00 UTC.
pub fn default_fallback_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 5, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            lookback: Duration::days(3 * 365),
            page_limit: MAX_PAGE_LIMIT,
            deadline: StdDuration::from_secs(60),
            fallback_start: default_fallback_start(),
        }
    }
}

pub struct HistoryFetcher<P> {
    provider: P,
    config: HistoryConfig,
}

impl<P: DataProvider> HistoryFetcher<P> {
    pub fn new(provider: P, config: HistoryConfig) -> Self {
        Self { provider, config }
    }

    /// Returns at most `limit` bars for `pair`/`timeframe`.
    ///
    /// Live data is preferred. When the provider fails, times out or answers
    /// with garbage, the failure is logged and `limit` synthetic bars are
    /// returned instead.
    pub async fn fetch<R: Rng>(
        &self,
        pair: &TradingPair,
        timeframe: TimeFrame,
        limit: usize,
        rng: &mut R,
    ) -> BarSeries {
        let now = Utc::now();
        let start = now - self.config.lookback;

        match self.fetch_live(pair, timeframe, start, now, limit).await {
            Ok(bars) => {
                let accumulated = bars.len();
                let bars = select_window(bars, limit, rng);
                info!(
                    %pair,
                    %timeframe,
                    accumulated,
                    kept = bars.len(),
                    "loaded exchange history"
                );
                BarSeries {
                    pair: pair.clone(),
                    timeframe,
                    source: SeriesSource::Exchange,
                    bars,
                }
            }
            Err(err) => {
                warn!(
                    %pair,
                    %timeframe,
                    error = %err,
                    "history fetch failed, using synthetic data"
                );
                BarSeries {
                    pair: pair.clone(),
                    timeframe,
                    source: SeriesSource::Synthetic,
                    bars: synthetic::generate(self.config.fallback_start, limit, timeframe, rng),
                }
            }
        }
    }

    /// Live paging only, bounded by the configured deadline. Errors are
    /// returned as-is; no fallback.
    pub async fn fetch_live(
        &self,
        pair: &TradingPair,
        timeframe: TimeFrame,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Bar>, ProviderError> {
        let run = collect_pages(
            &self.provider,
            pair,
            timeframe,
            start,
            end,
            limit,
            self.config.page_limit,
        );
        tokio::time::timeout(self.config.deadline, run)
            .await
            .context(TimeoutSnafu)?
    }
}

/// Pages `provider` forward from `start`.
///
/// Stops on an empty page, once the cursor reaches `end`, or once at least
/// `limit` bars are buffered. The last page is kept whole, so the result may
/// hold more than `limit` bars. Bars that do not advance the timestamp are
/// dropped so the output stays strictly increasing.
pub async fn collect_pages<P: DataProvider + ?Sized>(
    provider: &P,
    pair: &TradingPair,
    timeframe: TimeFrame,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    limit: usize,
    page_limit: u32,
) -> Result<Vec<Bar>, ProviderError> {
    let mut bars: Vec<Bar> = Vec::new();
    let mut cursor = start;

    while cursor < end && bars.len() < limit {
        let page = provider
            .fetch_page(PageRequest {
                pair: pair.clone(),
                timeframe,
                since: cursor,
                limit: page_limit,
            })
            .await?;

        let Some(last) = page.last() else {
            debug!(%pair, %timeframe, %cursor, "empty page, history exhausted");
            break;
        };
        let next_cursor = last.timestamp + Duration::milliseconds(1);

        for bar in page {
            if bars.last().is_none_or(|prev| bar.timestamp > prev.timestamp) {
                bars.push(bar);
            }
        }

        if next_cursor <= cursor {
            // Provider ignored `since`; another request would loop forever.
            break;
        }
        cursor = next_cursor;
    }

    Ok(bars)
}

/// Keeps a uniformly random contiguous run of exactly `limit` bars when the
/// buffer is longer than that; shorter buffers are returned untouched.
pub fn select_window<R: Rng>(mut bars: Vec<Bar>, limit: usize, rng: &mut R) -> Vec<Bar> {
    if bars.len() <= limit {
        return bars;
    }
    let start = rng.random_range(0..=bars.len() - limit);
    bars.drain(..start);
    bars.truncate(limit);
    bars
}
