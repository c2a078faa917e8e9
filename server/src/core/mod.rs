//! Core application infrastructure

pub mod banner;
pub mod cli;
pub mod config;
pub mod constants;
pub mod shutdown;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::{AppConfig, DatabaseConfig, KpiFailurePolicy, ServerConfig};

// Re-export the fact service from the data layer
pub use crate::data::FactService;

pub use shutdown::ShutdownService;
