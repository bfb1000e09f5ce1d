//! Process-wide holder of the chart everyone is looking at.
//!
//! Readers take an `Arc` snapshot with one atomic load; writers swap in a
//! whole new [`ActiveSegment`]. A guess scored against a snapshot never sees
//! half of an old segment and half of a new one.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use market_data_ingestor::models::{
    bar_series::SeriesSource, pair::TradingPair, timeframe::TimeFrame,
};

use crate::segment::Segment;

/// A segment together with where its bars came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSegment {
    pub pair: TradingPair,
    pub timeframe: TimeFrame,
    pub source: SeriesSource,
    pub segment: Segment,
}

/// Starts empty; filled by the first successful refresh.
#[derive(Debug, Default)]
pub struct SessionState {
    active: ArcSwapOption<ActiveSegment>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in `next`, returning whatever was held before.
    pub fn replace(&self, next: ActiveSegment) -> Option<Arc<ActiveSegment>> {
        self.active.swap(Some(Arc::new(next)))
    }

    pub fn current(&self) -> Option<Arc<ActiveSegment>> {
        self.active.load_full()
    }

    pub fn clear(&self) -> Option<Arc<ActiveSegment>> {
        self.active.swap(None)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::{Duration, TimeZone, Utc};
    use market_data_ingestor::models::bar::Bar;

    use super::*;

    fn active(tag: f64) -> ActiveSegment {
        let t0 = Utc.with_ymd_and_hms(2025, 4, 5, 0, 0, 0).unwrap();
        let bar = |i: i64| Bar {
            timestamp: t0 + Duration::hours(i),
            open: tag,
            high: tag,
            low: tag,
            close: tag,
            volume: None,
        };
        ActiveSegment {
            pair: "BTC/USDT".parse().unwrap(),
            timeframe: TimeFrame::OneHour,
            source: SeriesSource::Synthetic,
            segment: Segment {
                start: 0,
                training: (0..50).map(bar).collect(),
                future: (50..100).map(bar).collect(),
            },
        }
    }

    #[test]
    fn starts_empty() {
        assert!(SessionState::new().current().is_none());
    }

    #[test]
    fn replace_returns_previous() {
        let session = SessionState::new();
        assert!(session.replace(active(1.0)).is_none());

        let previous = session.replace(active(2.0)).unwrap();
        assert_eq!(previous.segment.training[0].close, 1.0);
        assert_eq!(session.current().unwrap().segment.training[0].close, 2.0);

        session.clear();
        assert!(session.current().is_none());
    }

    #[test]
    fn snapshot_outlives_replacement() {
        let session = SessionState::new();
        session.replace(active(1.0));
        let held = session.current().unwrap();

        session.replace(active(2.0));

        assert!(held.segment.future.iter().all(|b| b.close == 1.0));
    }

    #[test]
    fn readers_never_see_mixed_segments() {
        let session = Arc::new(SessionState::new());
        session.replace(active(0.0));

        let writer = {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                for i in 1..500 {
                    session.replace(active(i as f64));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = session.current().unwrap();
                        let tag = snap.segment.training[0].close;
                        assert!(snap.segment.training.iter().all(|b| b.close == tag));
                        assert!(snap.segment.future.iter().all(|b| b.close == tag));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
