pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::storage::LocalTableSink;
pub use crate::config::{env::EnvConfig, toml_config::TomlConfig, RunConfig};
pub use crate::core::{etl::EtlEngine, loader::TripLoader, pipeline::TripsPipeline};
pub use crate::utils::error::{EtlError, Result};
