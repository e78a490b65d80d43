use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PICKUP_COLUMN: &str = "pickup_datetime";
pub const DROPOFF_COLUMN: &str = "dropoff_datetime";

/// Half-open window `[start, end)` walked in calendar-month steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub pickup_datetime: Option<NaiveDateTime>,
    pub dropoff_datetime: Option<NaiveDateTime>,
}

impl TripRecord {
    pub fn new(pickup: NaiveDateTime, dropoff: NaiveDateTime) -> Self {
        Self {
            pickup_datetime: Some(pickup),
            dropoff_datetime: Some(dropoff),
        }
    }
}

/// The accumulated result handed to the materialization step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripTable {
    records: Vec<TripRecord>,
}

impl TripTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_names(&self) -> [&'static str; 2] {
        [PICKUP_COLUMN, DROPOFF_COLUMN]
    }

    pub fn append(&mut self, batch: Vec<TripRecord>) {
        self.records.extend(batch);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded { rows: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub taxi_type: String,
    pub period: YearMonth,
    pub url: String,
    pub outcome: FetchOutcome,
}

impl FetchAttempt {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Complete,
    Partial,
    Failed,
    NothingToLoad,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadStatus::Complete => "complete",
            LoadStatus::Partial => "partial",
            LoadStatus::Failed => "failed",
            LoadStatus::NothingToLoad => "nothing to load",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub table: TripTable,
    pub attempts: Vec<FetchAttempt>,
}

impl LoadReport {
    pub fn status(&self) -> LoadStatus {
        let failed = self.failed_count();
        if self.attempts.is_empty() {
            LoadStatus::NothingToLoad
        } else if failed == 0 {
            LoadStatus::Complete
        } else if failed == self.attempts.len() {
            LoadStatus::Failed
        } else {
            LoadStatus::Partial
        }
    }

    pub fn failed_count(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_failure()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchAttempt> {
        self.attempts.iter().filter(|a| a.is_failure())
    }
}

/// Where the loaded table is materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub dataset: String,
    pub table: String,
}

impl Default for Destination {
    fn default() -> Self {
        Self {
            dataset: "staging".to_string(),
            table: "trips".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Strategy {
    #[default]
    Append,
    Replace,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub location: String,
    pub rows: usize,
    pub attempted: usize,
    pub failed: usize,
    pub status: LoadStatus,
}
