use market_data_ingestor::models::{pair::TradingPair, timeframe::TimeFrame};
use thiserror::Error;

use crate::{scorer::ScoreError, segment::SegmentError};

/// Why a user action could not produce a chart.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("No active chart, press New Chart first")]
    NoActiveSegment,

    #[error("Pair {pair} is not offered")]
    UnsupportedPair { pair: TradingPair },

    #[error("Timeframe {timeframe} is not offered")]
    UnsupportedTimeframe { timeframe: TimeFrame },
}
