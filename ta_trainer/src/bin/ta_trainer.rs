use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use market_data_ingestor::{history::HistoryFetcher, providers::binance_rest::BinanceProvider};
use rand::{SeedableRng, rngs::StdRng};
use ta_trainer::{
    config::{AppConfig, Overrides},
    server,
    trainer::{Trainer, UserAction},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Candlestick prediction trainer")]
struct Cli {
    /// TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Listen address, e.g. 127.0.0.1:8050
    #[arg(long)]
    bind: Option<String>,
    /// Fixed RNG seed for reproducible charts
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries program output only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(
        cli.config.as_deref(),
        Overrides {
            bind: cli.bind,
            seed: cli.seed,
        },
    )
    .context("loading configuration")?;
    let addr = config.bind_addr()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;

    let provider = BinanceProvider::new(config.binance()).context("building Binance client")?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let trainer = Arc::new(Trainer::new(
        HistoryFetcher::new(provider, config.history()),
        config.sampler(),
        config.catalog(),
        config.history.limit,
        rng,
    ));

    // First chart is drawn before the listener opens.
    if let Err(err) = runtime.block_on(trainer.apply(UserAction::Reset)) {
        warn!(error = %err, "no initial chart");
    }

    let listener = Arc::new(server::bind(addr)?);
    info!(%addr, "serving trainer");
    server::run(listener, trainer, runtime.handle().clone(), config.workers)?;
    Ok(())
}
