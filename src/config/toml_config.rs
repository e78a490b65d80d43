use crate::config::{default_taxi_types, RunConfig, DEFAULT_OUTPUT_PATH};
use crate::core::months::DEFAULT_BASE_URL;
use crate::core::source::{ColumnMapping, ColumnPair};
use crate::core::ConfigProvider;
use crate::domain::model::{DateRange, Destination, Strategy};
use crate::utils::datetime::parse_iso_datetime;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub asset: AssetConfig,
    #[serde(default)]
    pub source: SourceConfig,
    pub window: WindowConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
    #[serde(default)]
    pub materialization: MaterializationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub taxi_types: Option<Vec<String>>,
    pub columns: Option<HashMap<String, ColumnPair>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub dataset: Option<String>,
    pub table: Option<String>,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializationConfig {
    #[serde(default)]
    pub strategy: Strategy,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BRUIN_START_DATE})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn asset_name(&self) -> &str {
        &self.asset.name
    }

    pub fn taxi_types(&self) -> Vec<String> {
        self.source
            .taxi_types
            .clone()
            .unwrap_or_else(default_taxi_types)
    }

    pub fn base_url(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn output_path(&self) -> &str {
        self.destination
            .output_path
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    pub fn destination(&self) -> Destination {
        let defaults = Destination::default();
        Destination {
            dataset: self.destination.dataset.clone().unwrap_or(defaults.dataset),
            table: self.destination.table.clone().unwrap_or(defaults.table),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn run_config(&self) -> Result<RunConfig> {
        let range = DateRange::new(
            parse_iso_datetime("window.start", &self.window.start)?,
            parse_iso_datetime("window.end", &self.window.end)?,
        );

        Ok(RunConfig {
            range,
            taxi_types: self.taxi_types(),
            base_url: self.base_url().to_string(),
            columns: ColumnMapping::new(self.source.columns.clone().unwrap_or_default()),
            output_path: self.output_path().to_string(),
            destination: self.destination(),
            strategy: self.materialization.strategy,
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("asset.name", &self.asset.name)?;
        self.run_config()?.validate()
    }
}
