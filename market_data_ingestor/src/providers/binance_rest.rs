//! Binance spot REST provider (public klines endpoint, no credentials).

pub mod params;
pub mod provider;
pub mod response;

pub use params::{MAX_PAGE_LIMIT, construct_params, validate_limit};
pub use provider::{BinanceConfig, BinanceProvider};
