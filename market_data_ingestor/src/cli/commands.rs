use std::path::PathBuf;

use clap::Parser;

use crate::models::{pair::TradingPair, timeframe::TimeFrame};

/// Download recent history for a list of pairs into one CSV per pair.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the CSV files are written to (created if missing)
    #[arg(long, default_value = "data")]
    pub out_dir: PathBuf,

    /// Bar interval: 5m, 15m, 30m, 1h, 4h or 1d
    #[arg(long, default_value = "5m")]
    pub timeframe: TimeFrame,

    /// How many days back from now to download
    #[arg(long, default_value_t = 60)]
    pub days: u32,

    /// Pair to download, repeatable (e.g. --pair BTC/USDT --pair ETH/USDT).
    /// Defaults to the trainer's pair list.
    #[arg(long = "pair")]
    pub pairs: Vec<TradingPair>,
}
