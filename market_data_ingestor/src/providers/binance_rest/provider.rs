use std::{num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde_json::Value;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{bar::Bar, request_params::PageRequest},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InternalSnafu, ProviderError, ProviderInitError,
        ReqwestSnafu,
        binance_rest::{
            params::{construct_params, validate_limit},
            response::{BinanceErrorBody, BinanceKline},
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const KLINES_PATH: &str = "/api/v3/klines";

/// Connection settings for [`BinanceProvider`].
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// Scheme and host, without a trailing path (e.g. `https://api.binance.com`).
    pub base_url: String,
    /// Per-request timeout; an expired request is a failed request.
    pub request_timeout: Duration,
    /// Client-side pacing of page requests.
    pub requests_per_second: NonZeroU32,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            requests_per_second: nonzero!(10u32),
        }
    }
}

pub struct BinanceProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl BinanceProvider {
    /// Creates a new Binance provider. The klines endpoint is public, so no
    /// credentials are involved.
    pub fn new(config: BinanceConfig) -> Result<Self, ProviderInitError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("market_data_ingestor/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::direct(Quota::per_second(config.requests_per_second)),
        })
    }

    pub fn klines_url(&self) -> String {
        format!("{}{KLINES_PATH}", self.base_url)
    }
}

#[async_trait]
impl DataProvider for BinanceProvider {
    async fn fetch_page(&self, params: PageRequest) -> Result<Vec<Bar>, ProviderError> {
        validate_limit(params.limit)?;

        self.limiter.until_ready().await;

        let query_params = construct_params(&params);
        let response = self
            .client
            .get(self.klines_url())
            .query(&query_params)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            let message = match serde_json::from_str::<BinanceErrorBody>(&body) {
                Ok(err) => format!("{} (code {})", err.msg, err.code),
                Err(_) => body,
            };
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let rows = response
            .json::<Vec<Vec<Value>>>()
            .await
            .context(ReqwestSnafu)?;

        let bars = rows
            .into_iter()
            .map(|row| {
                BinanceKline::try_from(row).map(Bar::from).map_err(|e| {
                    InternalSnafu {
                        message: e.to_string(),
                    }
                    .build()
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            pair = %params.pair,
            timeframe = %params.timeframe,
            since = %params.since,
            received = bars.len(),
            "fetched klines page"
        );

        Ok(bars)
    }
}
