use crate::domain::model::{DateRange, YearMonth};
use chrono::{Months, NaiveDateTime};

pub const DEFAULT_BASE_URL: &str = "https://d37ci6vzurychx.cloudfront.net";

/// Step dates visited by the loader: `start`, `start + 1 month`, ... while
/// strictly before `end`. Each step adds one month to the previous step, so
/// a day clamped at a short month stays clamped (Jan 31 -> Feb 28 -> Mar 28).
pub fn step_dates(range: &DateRange) -> Vec<NaiveDateTime> {
    let mut steps = Vec::new();
    let mut current = range.start;

    while current < range.end {
        steps.push(current);
        current = match current.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }

    steps
}

pub fn months(range: &DateRange) -> Vec<YearMonth> {
    step_dates(range).iter().map(YearMonth::of).collect()
}

pub fn source_url(base_url: &str, taxi_type: &str, period: YearMonth) -> String {
    format!(
        "{}/trip-data/{}_tripdata_{}-{:02}.parquet",
        base_url.trim_end_matches('/'),
        taxi_type,
        period.year,
        period.month
    )
}
