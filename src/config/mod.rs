#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

use crate::core::months::DEFAULT_BASE_URL;
use crate::core::source::ColumnMapping;
use crate::domain::model::{DateRange, Destination, Strategy};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_url, Validate,
};

pub const DEFAULT_OUTPUT_PATH: &str = "./warehouse";

pub fn default_taxi_types() -> Vec<String> {
    vec!["yellow".to_string()]
}

/// Everything one ingestion run needs, already parsed.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub range: DateRange,
    pub taxi_types: Vec<String>,
    pub base_url: String,
    pub columns: ColumnMapping,
    pub output_path: String,
    pub destination: Destination,
    pub strategy: Strategy,
}

impl RunConfig {
    pub fn new(range: DateRange, taxi_types: Vec<String>) -> Self {
        Self {
            range,
            taxi_types,
            base_url: DEFAULT_BASE_URL.to_string(),
            columns: ColumnMapping::default(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            destination: Destination::default(),
            strategy: Strategy::default(),
        }
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_string("destination.dataset", &self.destination.dataset)?;
        validate_non_empty_string("destination.table", &self.destination.table)?;

        if self.range.is_empty() {
            tracing::warn!(
                "start {} is not before end {}, no months will be fetched",
                self.range.start,
                self.range.end
            );
        }
        if self.taxi_types.is_empty() {
            tracing::warn!("No taxi types configured, no files will be fetched");
        }

        Ok(())
    }
}
