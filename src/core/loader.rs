use crate::core::months::{months, source_url};
use crate::core::{
    DateRange, FetchAttempt, FetchOutcome, LoadReport, SourceRequest, TripRecord, TripSource,
    YearMonth,
};
use crate::utils::error::Result;
use crate::utils::validation::validate_taxi_type;

/// Walks every (month, taxi type) pair of a window and accumulates the rows
/// of each file it can read. A failing file is logged and skipped.
pub struct TripLoader<S: TripSource> {
    source: S,
    base_url: String,
}

impl<S: TripSource> TripLoader<S> {
    pub fn new(source: S, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: base_url.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Requests in fetch order: month first, then taxi type.
    pub fn plan(&self, range: &DateRange, taxi_types: &[String]) -> Vec<SourceRequest> {
        months(range)
            .into_iter()
            .flat_map(|period| {
                taxi_types
                    .iter()
                    .map(move |taxi_type| self.request(taxi_type, period))
            })
            .collect()
    }

    pub async fn load(&self, range: &DateRange, taxi_types: &[String]) -> LoadReport {
        let mut report = LoadReport::default();

        for request in self.plan(range, taxi_types) {
            let outcome = match self.fetch(&request).await {
                Ok(rows) => {
                    let count = rows.len();
                    report.table.append(rows);
                    tracing::info!(
                        "Loaded {} rows for {} {}",
                        count,
                        request.taxi_type,
                        request.period
                    );
                    FetchOutcome::Loaded { rows: count }
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", request.url, e);
                    FetchOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            report.attempts.push(FetchAttempt {
                taxi_type: request.taxi_type,
                period: request.period,
                url: request.url,
                outcome,
            });
        }

        report
    }

    /// Taxi types end up in the file name, so a malformed one fails its own
    /// requests without touching the source.
    async fn fetch(&self, request: &SourceRequest) -> Result<Vec<TripRecord>> {
        validate_taxi_type("taxi_type", &request.taxi_type)?;
        self.source.fetch(request).await
    }

    fn request(&self, taxi_type: &str, period: YearMonth) -> SourceRequest {
        SourceRequest {
            taxi_type: taxi_type.to_string(),
            period,
            url: source_url(&self.base_url, taxi_type, period),
        }
    }
}
