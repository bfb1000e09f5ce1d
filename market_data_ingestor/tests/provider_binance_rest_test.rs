use std::{
    sync::{Arc, Mutex},
    thread,
};

use chrono::{Duration, TimeZone, Utc};
use market_data_ingestor::{
    models::{pair::TradingPair, request_params::PageRequest, timeframe::TimeFrame},
    providers::{
        DataProvider, ProviderError,
        binance_rest::{BinanceConfig, BinanceProvider},
    },
};
use tiny_http::{Header, Response, Server};

/// Serves `body` with `status` for every request and records request URLs.
fn stub_exchange(status: u16, body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_server = Arc::clone(&seen);

    thread::spawn(move || {
        for request in server.incoming_requests() {
            seen_by_server.lock().unwrap().push(request.url().to_string());
            let header =
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    (format!("http://{addr}"), seen)
}

fn provider(base_url: String) -> BinanceProvider {
    BinanceProvider::new(BinanceConfig {
        base_url,
        ..BinanceConfig::default()
    })
    .expect("Failed to create BinanceProvider")
}

fn page_request() -> PageRequest {
    PageRequest {
        pair: "BTC/USDT".parse().unwrap(),
        timeframe: TimeFrame::OneHour,
        since: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        limit: 2,
    }
}

#[tokio::test]
async fn test_parses_klines_from_stub() {
    let (url, seen) = stub_exchange(
        200,
        r#"[
            [1704067200000,"42283.58","42554.57","42261.02","42475.23","1271.68",1704070799999,"5.4e7",47134,"682.1","2.9e7","0"],
            [1704070800000,"42475.23","42775.00","42431.65","42613.56","1196.37",1704074399999,"5.1e7",44562,"611.9","2.6e7","0"]
        ]"#,
    );

    let bars = provider(url).fetch_page(page_request()).await.unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(
        bars[0].timestamp,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(bars[1].timestamp - bars[0].timestamp, Duration::hours(1));
    assert_eq!(bars[0].close, 42475.23);
    assert_eq!(bars[1].volume, Some(1196.37));

    let urls = seen.lock().unwrap();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].starts_with("/api/v3/klines?"));
    assert!(urls[0].contains("symbol=BTCUSDT"));
    assert!(urls[0].contains("interval=1h"));
    assert!(urls[0].contains("startTime=1704067200000"));
    assert!(urls[0].contains("limit=2"));
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let (url, _) = stub_exchange(400, r#"{"code":-1121,"msg":"Invalid symbol."}"#);

    let err = provider(url).fetch_page(page_request()).await.unwrap_err();

    match err {
        ProviderError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid symbol. (code -1121)");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_row_is_internal_error() {
    let (url, _) = stub_exchange(200, r#"[[1704067200000, "oops"]]"#);

    let err = provider(url).fetch_page(page_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Internal { .. }), "{err:?}");
}

#[tokio::test]
async fn test_oversized_page_is_rejected_before_any_request() {
    let (url, seen) = stub_exchange(200, "[]");
    let mut params = page_request();
    params.limit = 5000;

    let err = provider(url).fetch_page(params).await.unwrap_err();
    assert!(matches!(err, ProviderError::Validation { .. }));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_binance_provider_fetch_live() {
    // Talks to the real exchange; run with `--ignored` when online.
    let provider = BinanceProvider::new(BinanceConfig::default()).expect("client");
    let pair: TradingPair = "BTC/USDT".parse().unwrap();

    let bars = provider
        .fetch_page(PageRequest {
            pair,
            timeframe: TimeFrame::OneDay,
            since: Utc::now() - Duration::days(10),
            limit: 5,
        })
        .await
        .expect("live fetch");

    assert!(!bars.is_empty(), "Expected at least one daily bar");
    assert!(bars.len() <= 5, "Expected at most 5 bars due to limit");
    assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}
