//! Random train/reveal windows over a bar history.
//!
//! A [`SegmentSampler`] picks a contiguous window of
//! `training_size + future_size` bars and splits it in two: the first part is
//! shown to the user, the second is held back until a guess is made.

use market_data_ingestor::models::bar::Bar;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("Insufficient data: {available} bars available, {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("Window starting at {start} does not fit in {available} bars (window is {window})")]
    OutOfBounds {
        start: usize,
        window: usize,
        available: usize,
    },
}

/// A training prefix immediately followed by the held-back future.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Index of the first training bar in the source series.
    pub start: usize,
    pub training: Vec<Bar>,
    pub future: Vec<Bar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSampler {
    training_size: usize,
    future_size: usize,
}

impl Default for SegmentSampler {
    fn default() -> Self {
        Self::new(50, 50)
    }
}

impl SegmentSampler {
    pub const fn new(training_size: usize, future_size: usize) -> Self {
        Self {
            training_size,
            future_size,
        }
    }

    pub const fn training_size(&self) -> usize {
        self.training_size
    }

    pub const fn future_size(&self) -> usize {
        self.future_size
    }

    /// Total bars consumed by one segment.
    pub const fn window(&self) -> usize {
        self.training_size + self.future_size
    }

    /// Draws a start index uniformly from `0..=len - window` and splits there.
    pub fn sample<R: Rng>(&self, bars: &[Bar], rng: &mut R) -> Result<Segment, SegmentError> {
        let window = self.window();
        if bars.len() < window {
            return Err(SegmentError::InsufficientData {
                available: bars.len(),
                required: window,
            });
        }

        let start = rng.random_range(0..=bars.len() - window);
        self.split_at(bars, start)
    }

    /// Deterministic split of the window beginning at `start`.
    pub fn split_at(&self, bars: &[Bar], start: usize) -> Result<Segment, SegmentError> {
        let window = self.window();
        let end = start
            .checked_add(window)
            .filter(|end| *end <= bars.len())
            .ok_or(SegmentError::OutOfBounds {
                start,
                window,
                available: bars.len(),
            })?;

        let (training, future) = bars[start..end].split_at(self.training_size);
        Ok(Segment {
            start,
            training: training.to_vec(),
            future: future.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn bars(n: usize) -> Vec<Bar> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let price = i as f64;
                Bar {
                    timestamp: t0 + Duration::hours(i as i64),
                    open: price,
                    high: price + 1.0,
                    low: price - 1.0,
                    close: price,
                    volume: None,
                }
            })
            .collect()
    }

    #[test]
    fn split_at_last_valid_start() {
        let bars = bars(1000);
        let sampler = SegmentSampler::default();

        let segment = sampler.split_at(&bars, 900).unwrap();

        assert_eq!(segment.training, bars[900..950]);
        assert_eq!(segment.future, bars[950..1000]);
    }

    #[test]
    fn split_past_the_end_is_rejected() {
        let bars = bars(1000);
        let err = SegmentSampler::default().split_at(&bars, 901).unwrap_err();
        assert_eq!(
            err,
            SegmentError::OutOfBounds {
                start: 901,
                window: 100,
                available: 1000
            }
        );
    }

    #[test]
    fn short_history_reports_insufficient_data() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = SegmentSampler::default()
            .sample(&bars(40), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            SegmentError::InsufficientData {
                available: 40,
                required: 100
            }
        );
    }

    #[test]
    fn exact_window_has_a_single_start() {
        let bars = bars(100);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let segment = SegmentSampler::default().sample(&bars, &mut rng).unwrap();
            assert_eq!(segment.start, 0);
        }
    }

    #[test]
    fn uneven_split_sizes() {
        let sampler = SegmentSampler::new(30, 10);
        let segment = sampler.split_at(&bars(40), 0).unwrap();
        assert_eq!(segment.training.len(), 30);
        assert_eq!(segment.future.len(), 10);
    }

    proptest! {
        #[test]
        fn sampled_halves_are_adjacent(len in 100usize..1500, seed in any::<u64>()) {
            let bars = bars(len);
            let mut rng = StdRng::seed_from_u64(seed);
            let sampler = SegmentSampler::default();

            let segment = sampler.sample(&bars, &mut rng).unwrap();

            prop_assert!(segment.start <= len - 100);
            prop_assert_eq!(segment.training.len(), 50);
            prop_assert_eq!(segment.future.len(), 50);
            prop_assert_eq!(&segment.training[..], &bars[segment.start..segment.start + 50]);
            prop_assert_eq!(&segment.future[..], &bars[segment.start + 50..segment.start + 100]);
        }
    }
}
