//! Plain CSV files, one per series.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::SecondsFormat;
use snafu::ResultExt;
use tracing::info;

use crate::{
    io::sink::{DataSink, PrepareSnafu, SinkError, WriteSnafu},
    models::bar_series::BarSeries,
};

pub const HEADER: &str = "time,open,high,low,close";

/// Writes each series to `<dir>/<BASE>_<QUOTE>_<timeframe>.csv`, replacing
/// any existing file.
pub struct CsvDirSink {
    dir: PathBuf,
}

impl CsvDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, series: &BarSeries) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.csv",
            series.pair.file_stem(),
            series.timeframe
        ))
    }
}

/// Renders a series as CSV text, header included.
pub fn render_csv(series: &BarSeries) -> String {
    let mut out = String::with_capacity(64 * (series.bars.len() + 1));
    out.push_str(HEADER);
    out.push('\n');
    for bar in &series.bars {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            bar.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            bar.open,
            bar.high,
            bar.low,
            bar.close
        );
    }
    out
}

#[async_trait]
impl DataSink for CsvDirSink {
    type Output = Vec<PathBuf>;

    async fn write(&self, data: &[BarSeries]) -> Result<Self::Output, SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .context(PrepareSnafu {
                path: self.dir.display().to_string(),
            })?;

        let mut written = Vec::with_capacity(data.len());
        for series in data {
            let path = self.path_for(series);
            tokio::fs::write(&path, render_csv(series))
                .await
                .context(WriteSnafu {
                    path: path.display().to_string(),
                })?;
            info!(path = %path.display(), bars = series.len(), "wrote csv");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::models::{bar::Bar, bar_series::SeriesSource, timeframe::TimeFrame};

    fn series() -> BarSeries {
        BarSeries {
            pair: "SOL/USDT".parse().unwrap(),
            timeframe: TimeFrame::FiveMinutes,
            source: SeriesSource::Exchange,
            bars: vec![
                Bar {
                    timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                    open: 1.5,
                    high: 2.0,
                    low: 1.0,
                    close: 1.75,
                    volume: Some(10.0),
                },
                Bar {
                    timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 5, 0).unwrap(),
                    open: 1.75,
                    high: 1.8,
                    low: 1.7,
                    close: 1.7,
                    volume: None,
                },
            ],
        }
    }

    #[test]
    fn renders_header_and_rows() {
        let text = render_csv(&series());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "time,open,high,low,close",
                "2025-01-01T00:00:00Z,1.5,2,1,1.75",
                "2025-01-01T00:05:00Z,1.75,1.8,1.7,1.7",
            ]
        );
    }

    #[tokio::test]
    async fn writes_one_file_per_series_and_creates_dir() {
        let tmp = TempDir::new().unwrap();
        let sink = CsvDirSink::new(tmp.path().join("data"));

        let paths = sink.write(&[series()]).await.unwrap();

        assert_eq!(paths, vec![tmp.path().join("data").join("SOL_USDT_5m.csv")]);
        let content = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(content.starts_with(HEADER));
        assert_eq!(content.lines().count(), 3);
    }
}
