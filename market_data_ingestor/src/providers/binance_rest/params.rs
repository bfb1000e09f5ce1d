use crate::{
    models::request_params::PageRequest,
    providers::{ProviderError, ValidationSnafu},
};

/// Largest page the klines endpoint serves.
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Checks the page size against the endpoint's bounds.
pub fn validate_limit(limit: u32) -> Result<(), ProviderError> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return ValidationSnafu {
            message: format!("page limit must be within 1..={MAX_PAGE_LIMIT}, got {limit}"),
        }
        .fail();
    }
    Ok(())
}

/// Builds the query string for `GET /api/v3/klines`.
pub fn construct_params(params: &PageRequest) -> Vec<(String, String)> {
    vec![
        ("symbol".to_string(), params.pair.exchange_symbol()),
        ("interval".to_string(), params.timeframe.as_str().to_string()),
        (
            "startTime".to_string(),
            params.since.timestamp_millis().to_string(),
        ),
        ("limit".to_string(), params.limit.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::timeframe::TimeFrame;

    #[test]
    fn query_uses_exchange_symbol_and_millis() {
        let params = PageRequest {
            pair: "btc/usdt".parse().unwrap(),
            timeframe: TimeFrame::FourHours,
            since: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            limit: 500,
        };

        let query = construct_params(&params);
        assert_eq!(
            query,
            vec![
                ("symbol".to_string(), "BTCUSDT".to_string()),
                ("interval".to_string(), "4h".to_string()),
                ("startTime".to_string(), "1704067200000".to_string()),
                ("limit".to_string(), "500".to_string()),
            ]
        );
    }

    #[test]
    fn limit_bounds() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(MAX_PAGE_LIMIT).is_ok());
        assert!(matches!(
            validate_limit(0),
            Err(ProviderError::Validation { .. })
        ));
        assert!(validate_limit(MAX_PAGE_LIMIT + 1).is_err());
    }
}
