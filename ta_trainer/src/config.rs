//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment overrides, then command line flags. The merged result is
//! validated once, before anything is fetched.
//!
//! ```toml
//! bind = "127.0.0.1:8050"
//! seed = 42
//!
//! [exchange]
//! base_url = "https://api.binance.com"
//! requests_per_second = 5
//!
//! [market]
//! pairs = ["BTC/USDT", "ETH/USDT"]
//! default_pair = "ETH/USDT"
//! default_timeframe = "4h"
//! ```

use std::{net::SocketAddr, num::NonZeroU32, path::Path, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use market_data_ingestor::{
    history::{HistoryConfig, default_fallback_start},
    models::{
        pair::{TradingPair, default_pairs},
        timeframe::TimeFrame,
    },
    providers::binance_rest::{BinanceConfig, MAX_PAGE_LIMIT, provider::DEFAULT_BASE_URL},
};
use serde::Deserialize;
use shared_utils::{
    config::{ConfigError, load_toml_file},
    env::env_override,
};
use tracing::debug;

use crate::{segment::SegmentSampler, trainer::Catalog};

pub const ENV_BIND_ADDR: &str = "TRAINER_BIND_ADDR";
pub const ENV_EXCHANGE_URL: &str = "TRAINER_EXCHANGE_URL";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Listen address of the HTTP server.
    pub bind: String,
    /// Threads answering HTTP requests.
    pub workers: usize,
    /// Fixed seed for reproducible charts. Random when absent.
    pub seed: Option<u64>,
    pub exchange: ExchangeSettings,
    pub history: HistorySettings,
    pub segment: SegmentSettings,
    pub market: MarketSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExchangeSettings {
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Budget for one whole paging run, in seconds.
    pub fetch_deadline_secs: u64,
    pub requests_per_second: NonZeroU32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistorySettings {
    pub lookback_years: u32,
    pub page_limit: u32,
    /// Bars kept per refresh.
    pub limit: usize,
    pub fallback_start: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentSettings {
    pub training_size: usize,
    pub future_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketSettings {
    pub pairs: Vec<TradingPair>,
    pub timeframes: Vec<TimeFrame>,
    pub default_pair: TradingPair,
    pub default_timeframe: TimeFrame,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:10000".to_string(),
            workers: 4,
            seed: None,
            exchange: ExchangeSettings::default(),
            history: HistorySettings::default(),
            segment: SegmentSettings::default(),
            market: MarketSettings::default(),
        }
    }
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        let binance = BinanceConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: binance.request_timeout.as_secs(),
            fetch_deadline_secs: 60,
            requests_per_second: binance.requests_per_second,
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            lookback_years: 3,
            page_limit: MAX_PAGE_LIMIT,
            limit: 1000,
            fallback_start: default_fallback_start(),
        }
    }
}

impl Default for SegmentSettings {
    fn default() -> Self {
        let sampler = SegmentSampler::default();
        Self {
            training_size: sampler.training_size(),
            future_size: sampler.future_size(),
        }
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            pairs: default_pairs().unwrap_or_else(|_| vec![TradingPair::default()]),
            timeframes: TimeFrame::ALL.to_vec(),
            default_pair: TradingPair::default(),
            default_timeframe: TimeFrame::OneHour,
        }
    }
}

/// Command line values that win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Merges every layer and validates the result.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => load_toml_file::<AppConfig>(path)?,
            None => AppConfig::default(),
        };
        config.apply_env();
        config.apply_overrides(overrides);
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Some(bind) = env_override(ENV_BIND_ADDR) {
            self.bind = bind;
        }
        if let Some(url) = env_override(ENV_EXCHANGE_URL) {
            self.exchange.base_url = url;
        }
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.workers == 0 {
            return invalid("workers", "must be at least 1");
        }
        if self.exchange.base_url.trim().is_empty() {
            return invalid("exchange.base_url", "must not be empty");
        }
        if self.exchange.request_timeout_secs == 0 {
            return invalid("exchange.request_timeout_secs", "must be at least 1");
        }
        if self.exchange.fetch_deadline_secs == 0 {
            return invalid("exchange.fetch_deadline_secs", "must be at least 1");
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&self.history.page_limit) {
            return invalid(
                "history.page_limit",
                format!("must be between 1 and {MAX_PAGE_LIMIT}"),
            );
        }
        if self.history.limit == 0 {
            return invalid("history.limit", "must be at least 1");
        }
        if self.segment.training_size == 0 {
            return invalid("segment.training_size", "must be at least 1");
        }
        if self.segment.future_size == 0 {
            return invalid("segment.future_size", "must be at least 1");
        }
        if self.market.pairs.is_empty() {
            return invalid("market.pairs", "must list at least one pair");
        }
        if self.market.timeframes.is_empty() {
            return invalid("market.timeframes", "must list at least one timeframe");
        }
        if !self.market.pairs.contains(&self.market.default_pair) {
            return invalid(
                "market.default_pair",
                format!("{} is not in market.pairs", self.market.default_pair),
            );
        }
        if !self.market.timeframes.contains(&self.market.default_timeframe) {
            return invalid(
                "market.default_timeframe",
                format!("{} is not in market.timeframes", self.market.default_timeframe),
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|e| ConfigError::Invalid {
            field: "bind",
            message: format!("`{}`: {e}", self.bind),
        })
    }

    pub fn binance(&self) -> BinanceConfig {
        BinanceConfig {
            base_url: self.exchange.base_url.clone(),
            request_timeout: StdDuration::from_secs(self.exchange.request_timeout_secs),
            requests_per_second: self.exchange.requests_per_second,
        }
    }

    pub fn history(&self) -> HistoryConfig {
        HistoryConfig {
            lookback: Duration::days(365 * i64::from(self.history.lookback_years)),
            page_limit: self.history.page_limit,
            deadline: StdDuration::from_secs(self.exchange.fetch_deadline_secs),
            fallback_start: self.history.fallback_start,
        }
    }

    pub fn sampler(&self) -> SegmentSampler {
        SegmentSampler::new(self.segment.training_size, self.segment.future_size)
    }

    pub fn catalog(&self) -> Catalog {
        Catalog {
            pairs: self.market.pairs.clone(),
            timeframes: self.market.timeframes.clone(),
            default_pair: self.market.default_pair.clone(),
            default_timeframe: self.market.default_timeframe,
        }
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid {
        field,
        message: message.into(),
    })
}
