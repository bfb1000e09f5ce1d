//! Market data ingestion: exchange providers, bounded history retrieval with
//! a synthetic fallback, and sinks for exporting bar series.

#[cfg(feature = "cli")]
pub mod cli;
pub mod history;
pub mod io;
pub mod models;
pub mod providers;
pub mod synthetic;
