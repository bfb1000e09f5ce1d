//! What the page draws after each action.

use market_data_ingestor::models::{
    bar::Bar, bar_series::SeriesSource, pair::TradingPair, timeframe::TimeFrame,
};
use serde::Serialize;

use crate::{error::TrainerError, scorer::Verdict, session::ActiveSegment};

pub const MODE_TRAINING: &str = "Training Mode";
pub const MODE_REVEALED: &str = "Prediction Revealed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub pair: TradingPair,
    pub timeframe: TimeFrame,
    pub source: Option<SeriesSource>,
    pub mode: String,
    pub result: String,
    pub training: Vec<Bar>,
    /// Only present once a guess has been made.
    pub future: Option<Vec<Bar>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    /// Up/Down are only offered while a segment with a future is held.
    pub can_guess: bool,
}

impl View {
    /// Mode shown right after a new chart was drawn.
    pub fn refreshed_mode(training_size: usize) -> String {
        format!("{MODE_TRAINING} (First {training_size} Candles)")
    }

    pub fn training(active: &ActiveSegment, mode: impl Into<String>) -> Self {
        Self {
            pair: active.pair.clone(),
            timeframe: active.timeframe,
            source: Some(active.source),
            mode: mode.into(),
            result: String::new(),
            training: active.segment.training.clone(),
            future: None,
            verdict: None,
            can_guess: !active.segment.future.is_empty(),
        }
    }

    pub fn revealed(active: &ActiveSegment, verdict: Verdict) -> Self {
        Self {
            result: verdict.message().to_string(),
            future: Some(active.segment.future.clone()),
            verdict: Some(verdict),
            ..Self::training(active, MODE_REVEALED)
        }
    }

    /// Empty chart with the error in the mode line.
    pub fn error(pair: TradingPair, timeframe: TimeFrame, err: &TrainerError) -> Self {
        Self {
            pair,
            timeframe,
            source: None,
            mode: format!("Error: {err}"),
            result: String::new(),
            training: Vec::new(),
            future: None,
            verdict: None,
            can_guess: false,
        }
    }
}
