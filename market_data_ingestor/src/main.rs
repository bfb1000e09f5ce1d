use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use market_data_ingestor::{
    cli::{commands::Cli, params::resolve_pairs},
    history::collect_pages,
    io::{csv::CsvDirSink, sink::DataSink},
    models::bar_series::{BarSeries, SeriesSource},
    providers::binance_rest::{BinanceConfig, BinanceProvider, MAX_PAGE_LIMIT, provider::DEFAULT_BASE_URL},
};
use shared_utils::env::env_override;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries program output only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let pairs = resolve_pairs(cli.pairs).context("resolving pair list")?;

    let base_url = env_override("BINANCE_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let provider = BinanceProvider::new(BinanceConfig {
        base_url,
        ..BinanceConfig::default()
    })
    .context("building Binance client")?;
    let sink = CsvDirSink::new(&cli.out_dir);

    let end = Utc::now();
    let start = end - Duration::days(i64::from(cli.days));
    let limit = cli.timeframe.bars_per_days(cli.days) as usize;
    info!(
        pairs = pairs.len(),
        timeframe = %cli.timeframe,
        days = cli.days,
        out_dir = %cli.out_dir.display(),
        "starting export"
    );

    let mut success_count = 0;
    let mut error_count = 0;

    for pair in pairs {
        info!(%pair, "downloading");
        let result = collect_pages(&provider, &pair, cli.timeframe, start, end, limit, MAX_PAGE_LIMIT).await;

        let bars = match result {
            Ok(bars) => bars,
            Err(e) => {
                error!(%pair, error = %e, "download failed");
                eprintln!("ERROR: {pair} - {e}");
                error_count += 1;
                continue;
            }
        };

        let series = BarSeries {
            pair: pair.clone(),
            timeframe: cli.timeframe,
            source: SeriesSource::Exchange,
            bars,
        };
        match sink.write(std::slice::from_ref(&series)).await {
            Ok(paths) => {
                for path in paths {
                    println!("{}", path.display());
                }
                success_count += 1;
            }
            Err(e) => {
                error!(%pair, error = %e, "write failed");
                eprintln!("ERROR: {pair} - {e}");
                error_count += 1;
            }
        }
    }

    // Summary goes to stderr so stdout stays a clean list of paths
    eprintln!("SUMMARY: {success_count} succeeded, {error_count} failed");
    Ok(())
}
