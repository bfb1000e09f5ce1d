//! Wire shapes of the klines endpoint.
//!
//! A kline is a positional JSON array:
//! `[open_time, "open", "high", "low", "close", "volume", close_time, ...]`.
//! Only the first six fields are read.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::bar::Bar;

#[derive(Debug, Error, PartialEq)]
pub enum KlineError {
    #[error("kline has {0} fields, expected at least 6")]
    InvalidLength(usize),
    #[error("kline field `{0}` has an unexpected type")]
    InvalidType(&'static str),
    #[error("kline open time {0} is out of range")]
    InvalidTimestamp(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinanceKline {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Error body returned with non-2xx statuses.
#[derive(Deserialize, Debug)]
pub struct BinanceErrorBody {
    pub code: i64,
    pub msg: String,
}

fn price(value: &Value, field: &'static str) -> Result<f64, KlineError> {
    // Prices arrive as decimal strings; accept plain numbers too.
    match value {
        Value::String(s) => s.parse().map_err(|_| KlineError::InvalidType(field)),
        Value::Number(n) => n.as_f64().ok_or(KlineError::InvalidType(field)),
        _ => Err(KlineError::InvalidType(field)),
    }
}

impl TryFrom<Vec<Value>> for BinanceKline {
    type Error = KlineError;

    fn try_from(fields: Vec<Value>) -> Result<Self, Self::Error> {
        if fields.len() < 6 {
            return Err(KlineError::InvalidLength(fields.len()));
        }
        let millis = fields[0]
            .as_i64()
            .ok_or(KlineError::InvalidType("open_time"))?;
        let open_time =
            DateTime::from_timestamp_millis(millis).ok_or(KlineError::InvalidTimestamp(millis))?;

        Ok(Self {
            open_time,
            open: price(&fields[1], "open")?,
            high: price(&fields[2], "high")?,
            low: price(&fields[3], "low")?,
            close: price(&fields[4], "close")?,
            volume: price(&fields[5], "volume")?,
        })
    }
}

impl From<BinanceKline> for Bar {
    fn from(k: BinanceKline) -> Self {
        Bar {
            timestamp: k.open_time,
            open: k.open,
            high: k.high,
            low: k.low,
            close: k.close,
            volume: Some(k.volume),
        }
    }
}
