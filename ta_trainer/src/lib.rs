pub mod config;
pub mod error;
pub mod scorer;
pub mod segment;
pub mod server;
pub mod session;
pub mod trainer;
pub mod view;
