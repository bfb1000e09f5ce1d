use std::{fmt, str::FromStr};

use market_data_ingestor::models::bar::Bar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Cannot score a guess against an empty future")]
    EmptyFuture,

    #[error("Unknown direction `{input}`, expected `up` or `down`")]
    UnknownDirection { input: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

impl FromStr for Direction {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(ScoreError::UnknownDirection {
                input: s.to_string(),
            }),
        }
    }
}

/// Outcome of one guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub guessed: Direction,
    pub actual: Direction,
    pub correct: bool,
    pub first_close: f64,
    pub last_close: f64,
}

impl Verdict {
    pub fn message(&self) -> &'static str {
        if self.correct {
            "✅ Correct Prediction!"
        } else {
            "❌ Wrong Prediction!"
        }
    }
}

fn endpoints(future: &[Bar]) -> Result<(&Bar, &Bar), ScoreError> {
    match (future.first(), future.last()) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(ScoreError::EmptyFuture),
    }
}

/// Direction the future actually took. Only a strictly higher last close
/// counts as up; a flat future is down.
pub fn realized_direction(future: &[Bar]) -> Result<Direction, ScoreError> {
    let (first, last) = endpoints(future)?;
    if last.close > first.close {
        Ok(Direction::Up)
    } else {
        Ok(Direction::Down)
    }
}

pub fn score(future: &[Bar], guessed: Direction) -> Result<Verdict, ScoreError> {
    let actual = realized_direction(future)?;
    let (first, last) = endpoints(future)?;

    Ok(Verdict {
        guessed,
        actual,
        correct: guessed == actual,
        first_close: first.close,
        last_close: last.close,
    })
}
