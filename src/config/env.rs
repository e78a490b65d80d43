use crate::config::{default_taxi_types, RunConfig};
use crate::core::ConfigProvider;
use crate::domain::model::DateRange;
use crate::utils::datetime::parse_iso_datetime;
use crate::utils::error::{EtlError, Result};
use serde::Deserialize;
use std::env;

pub const START_DATE_VAR: &str = "BRUIN_START_DATE";
pub const END_DATE_VAR: &str = "BRUIN_END_DATE";
pub const VARS_VAR: &str = "BRUIN_VARS";

#[derive(Debug, Deserialize)]
struct PipelineVars {
    #[serde(default = "default_taxi_types")]
    taxi_types: Vec<String>,
}

/// Inputs handed over by the pipeline runner through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub start_date: String,
    pub end_date: String,
    pub taxi_types: Vec<String>,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| EtlError::MissingConfigError {
                field: key.to_string(),
            })
        };
        let start_date = required(START_DATE_VAR)?;
        let end_date = required(END_DATE_VAR)?;

        // 未設定時視為空物件
        let raw_vars = lookup(VARS_VAR).unwrap_or_else(|| "{}".to_string());
        let vars: PipelineVars = serde_json::from_str(&raw_vars)?;

        Ok(Self {
            start_date,
            end_date,
            taxi_types: vars.taxi_types,
        })
    }

    pub fn date_range(&self) -> Result<DateRange> {
        Ok(DateRange::new(
            parse_iso_datetime(START_DATE_VAR, &self.start_date)?,
            parse_iso_datetime(END_DATE_VAR, &self.end_date)?,
        ))
    }
}

impl ConfigProvider for EnvConfig {
    fn run_config(&self) -> Result<RunConfig> {
        Ok(RunConfig::new(self.date_range()?, self.taxi_types.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_taxi_types_default_to_yellow() {
        let config = EnvConfig::from_lookup(lookup(&[
            (START_DATE_VAR, "2023-01-01"),
            (END_DATE_VAR, "2023-03-01"),
        ]))
        .unwrap();

        assert_eq!(config.taxi_types, vec!["yellow".to_string()]);

        let config = EnvConfig::from_lookup(lookup(&[
            (START_DATE_VAR, "2023-01-01"),
            (END_DATE_VAR, "2023-03-01"),
            (VARS_VAR, r#"{"other": 1}"#),
        ]))
        .unwrap();

        assert_eq!(config.taxi_types, vec!["yellow".to_string()]);
    }

    #[test]
    fn test_taxi_types_from_vars() {
        let config = EnvConfig::from_lookup(lookup(&[
            (START_DATE_VAR, "2023-01-01"),
            (END_DATE_VAR, "2023-03-01"),
            (VARS_VAR, r#"{"taxi_types": ["yellow", "green"]}"#),
        ]))
        .unwrap();

        assert_eq!(config.taxi_types, vec!["yellow", "green"]);
    }

    #[test]
    fn test_explicit_empty_taxi_types_are_kept() {
        let config = EnvConfig::from_lookup(lookup(&[
            (START_DATE_VAR, "2023-01-01"),
            (END_DATE_VAR, "2023-03-01"),
            (VARS_VAR, r#"{"taxi_types": []}"#),
        ]))
        .unwrap();

        assert!(config.taxi_types.is_empty());
    }

    #[test]
    fn test_missing_start_date_is_an_error() {
        let err = EnvConfig::from_lookup(lookup(&[(END_DATE_VAR, "2023-03-01")])).unwrap_err();

        assert!(matches!(
            err,
            EtlError::MissingConfigError { ref field } if field == START_DATE_VAR
        ));
    }

    #[test]
    fn test_malformed_vars_are_an_error() {
        for raw in ["not json", r#"["yellow"]"#, r#"{"taxi_types": "yellow"}"#] {
            let result = EnvConfig::from_lookup(lookup(&[
                (START_DATE_VAR, "2023-01-01"),
                (END_DATE_VAR, "2023-03-01"),
                (VARS_VAR, raw),
            ]));
            assert!(
                matches!(result, Err(EtlError::SerializationError(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_unparseable_dates_propagate_from_run_config() {
        let config = EnvConfig::from_lookup(lookup(&[
            (START_DATE_VAR, "2023-01-01"),
            (END_DATE_VAR, "March"),
        ]))
        .unwrap();

        let err = config.run_config().unwrap_err();
        assert!(matches!(
            err,
            EtlError::DateTimeParseError { ref field, .. } if field == END_DATE_VAR
        ));
    }

    #[test]
    fn test_run_config_from_env_values() {
        let config = EnvConfig::from_lookup(lookup(&[
            (START_DATE_VAR, "2023-01-15"),
            (END_DATE_VAR, "2023-01-20T00:00:00"),
            (VARS_VAR, r#"{"taxi_types": ["yellow", "green"]}"#),
        ]))
        .unwrap()
        .run_config()
        .unwrap();

        assert_eq!(config.range.start.to_string(), "2023-01-15 00:00:00");
        assert_eq!(config.range.end.to_string(), "2023-01-20 00:00:00");
        assert_eq!(config.taxi_types.len(), 2);
    }
}
