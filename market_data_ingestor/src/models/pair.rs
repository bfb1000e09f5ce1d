use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("Invalid trading pair `{input}`, expected BASE/QUOTE (e.g. BTC/USDT)")]
    Malformed { input: String },
}

/// Pairs offered by the trainer and exported by default.
pub const DEFAULT_PAIRS: [&str; 9] = [
    "BTC/USDT",
    "ETH/USDT",
    "XRP/USDT",
    "BNB/USDT",
    "SOL/USDT",
    "ADA/USDT",
    "DOGE/USDT",
    "DOT/USDT",
    "MATIC/USDT",
];

pub fn default_pairs() -> Result<Vec<TradingPair>, PairError> {
    DEFAULT_PAIRS.iter().map(|p| p.parse()).collect()
}

/// A spot trading pair such as `BTC/USDT`.
///
/// Both legs are stored upper-cased and must be ASCII alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TradingPair {
    base: String,
    quote: String,
}

impl TradingPair {
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Symbol as exchanges spell it, without a separator (`BTCUSDT`).
    pub fn exchange_symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Filesystem-friendly name (`BTC_USDT`).
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }
}

/// `BTC/USDT`.
impl Default for TradingPair {
    fn default() -> Self {
        Self {
            base: "BTC".to_string(),
            quote: "USDT".to_string(),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for TradingPair {
    type Err = PairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PairError::Malformed {
            input: s.to_string(),
        };
        let (base, quote) = s.trim().split_once('/').ok_or_else(malformed)?;
        let valid = |leg: &str| !leg.is_empty() && leg.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(base) || !valid(quote) {
            return Err(malformed());
        }
        Ok(Self {
            base: base.to_ascii_uppercase(),
            quote: quote.to_ascii_uppercase(),
        })
    }
}

impl TryFrom<String> for TradingPair {
    type Error = PairError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TradingPair> for String {
    fn from(pair: TradingPair) -> Self {
        pair.to_string()
    }
}
