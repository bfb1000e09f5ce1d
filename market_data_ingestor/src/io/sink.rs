use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::bar_series::BarSeries;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// An error occurred while trying to write the data.
    #[snafu(display("Failed to write {path}: {source}"))]
    Write {
        path: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The destination could not be prepared (e.g. the output directory).
    #[snafu(display("Failed to prepare destination {path}: {source}"))]
    Prepare {
        path: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// This makes the trait flexible. For example:
    /// - A file sink might return `Vec<PathBuf>`, the paths to the created files.
    /// - A database sink might return `usize`, the number of rows inserted.
    type Output;

    /// Writes a slice of `BarSeries` to the destination.
    ///
    /// # Arguments
    /// * `data` - A slice of `BarSeries` to be written.
    async fn write(&self, data: &[BarSeries]) -> Result<Self::Output, SinkError>;
}
