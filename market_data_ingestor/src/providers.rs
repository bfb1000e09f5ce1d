//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single seam between the
//! history fetcher and any exchange. A provider answers one page request at a
//! time; paging, windowing and fallback live in [`crate::history`].
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn DataProvider`) for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{bar::Bar, request_params::PageRequest};
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_page(&self, _params: PageRequest) -> Result<Vec<Bar>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```
//!

pub mod binance_rest;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{bar::Bar, request_params::PageRequest};

/// Trait for fetching pages of bar data from a market data provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches one page of bars opening at or after `params.since`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Bar>)` - At most `params.limit` bars, oldest first. An empty
    ///   page means there is no more data.
    /// * `Err(ProviderError)` - If the request fails for any reason.
    async fn fetch_page(&self, params: PageRequest) -> Result<Vec<Bar>, ProviderError>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    async fn fetch_page(&self, params: PageRequest) -> Result<Vec<Bar>, ProviderError> {
        (**self).fetch_page(params).await
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, per-request timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with an error status (rate limit, unknown symbol, ...).
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The provider answered with data we could not make sense of.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// The whole paging run took longer than the allowed deadline.
    #[snafu(display("History request timed out: {source}"))]
    Timeout {
        source: tokio::time::error::Elapsed,
        backtrace: Backtrace,
    },
}
