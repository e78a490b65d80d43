use crate::core::{LoadStatus, Pipeline, RunSummary};
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting trip ingestion");

        // Extract
        let report = self.pipeline.extract().await?;
        let status = report.status();
        tracing::info!(
            "Extracted {} rows from {} files ({})",
            report.table.len(),
            report.attempts.len(),
            status
        );

        match status {
            LoadStatus::Partial => {
                for attempt in report.failures() {
                    tracing::debug!(
                        "Skipped {} {}: {}",
                        attempt.taxi_type,
                        attempt.period,
                        attempt.url
                    );
                }
            }
            LoadStatus::Failed => {
                tracing::warn!("Every source failed, the output table will be empty");
            }
            LoadStatus::NothingToLoad => {
                tracing::warn!("Date window or taxi type list is empty, nothing was fetched");
            }
            LoadStatus::Complete => {}
        }

        // Load
        let summary = self.pipeline.load(report).await?;
        tracing::info!("Wrote {} rows to {}", summary.rows, summary.location);

        Ok(summary)
    }
}
