//! Random-walk OHLC generator used when live history is unavailable.
//!
//! Opens follow a random walk from [`BASE_PRICE`]; close, high and low are
//! drawn independently around each bar's open. The shape is fixed, only the
//! draws vary, so callers get usable-looking data without any network access.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::models::{bar::Bar, timeframe::TimeFrame};

pub const BASE_PRICE: f64 = 85_000.0;
/// Maximum step of the open random walk, either direction.
pub const OPEN_STEP: f64 = 100.0;
/// Maximum distance of the close from the open, either direction.
pub const CLOSE_SPREAD: f64 = 25.0;
/// Maximum wick length above (high) or below (low) the open.
pub const WICK: f64 = 100.0;

/// Produces exactly `periods` bars starting at `start`, one `timeframe` apart.
pub fn generate<R: Rng>(
    start: DateTime<Utc>,
    periods: usize,
    timeframe: TimeFrame,
    rng: &mut R,
) -> Vec<Bar> {
    let step = timeframe.duration();
    let mut bars = Vec::with_capacity(periods);
    let mut timestamp = start;
    let mut open = BASE_PRICE;

    for _ in 0..periods {
        open += symmetric(rng, OPEN_STEP);
        bars.push(Bar {
            timestamp,
            open,
            high: open + rng.random::<f64>() * WICK,
            low: open - rng.random::<f64>() * WICK,
            close: open + symmetric(rng, CLOSE_SPREAD),
            volume: None,
        });
        timestamp += step;
    }

    bars
}

/// Uniform draw in `[-half_width, half_width)`.
fn symmetric<R: Rng>(rng: &mut R, half_width: f64) -> f64 {
    (rng.random::<f64>() - 0.5) * 2.0 * half_width
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 5, 0, 0, 0).unwrap()
    }

    #[test]
    fn zero_periods_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate(start(), 0, TimeFrame::OneHour, &mut rng).is_empty());
    }

    #[test]
    fn bars_stay_within_draw_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let bars = generate(start(), 500, TimeFrame::FiveMinutes, &mut rng);

        let mut prev_open = BASE_PRICE;
        for bar in &bars {
            assert!((bar.open - prev_open).abs() <= OPEN_STEP);
            assert!((bar.close - bar.open).abs() <= CLOSE_SPREAD);
            assert!(bar.high >= bar.open && bar.high - bar.open < WICK);
            assert!(bar.low <= bar.open && bar.open - bar.low < WICK);
            assert_eq!(bar.volume, None);
            prev_open = bar.open;
        }
    }

    #[test]
    fn same_seed_same_series() {
        let a = generate(start(), 50, TimeFrame::OneDay, &mut StdRng::seed_from_u64(42));
        let b = generate(start(), 50, TimeFrame::OneDay, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn exact_length_and_even_spacing(periods in 0usize..2000, tf_idx in 0usize..6, seed: u64) {
            let timeframe = TimeFrame::ALL[tf_idx];
            let mut rng = StdRng::seed_from_u64(seed);
            let bars = generate(start(), periods, timeframe, &mut rng);

            prop_assert_eq!(bars.len(), periods);
            if let Some(first) = bars.first() {
                prop_assert_eq!(first.timestamp, start());
            }
            for pair in bars.windows(2) {
                prop_assert_eq!(pair[1].timestamp - pair[0].timestamp, timeframe.duration());
            }
        }
    }
}
