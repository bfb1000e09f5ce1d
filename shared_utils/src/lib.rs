//! Small helpers shared by the workspace crates: environment lookups and
//! TOML config loading.

pub mod config;
pub mod env;
