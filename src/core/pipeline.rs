use crate::config::RunConfig;
use crate::core::loader::TripLoader;
use crate::core::source::HttpParquetSource;
use crate::core::{LoadReport, Pipeline, RunSummary, SourceRequest, TableSink, TripSource};
use crate::utils::error::Result;

pub struct TripsPipeline<S: TripSource, K: TableSink> {
    loader: TripLoader<S>,
    sink: K,
    config: RunConfig,
}

impl<K: TableSink> TripsPipeline<HttpParquetSource, K> {
    /// Pipeline reading from the configured trip data host over HTTP.
    pub fn over_http(sink: K, config: RunConfig) -> Self {
        let source = HttpParquetSource::new(config.columns.clone());
        Self::new(source, sink, config)
    }
}

impl<S: TripSource, K: TableSink> TripsPipeline<S, K> {
    pub fn new(source: S, sink: K, config: RunConfig) -> Self {
        Self {
            loader: TripLoader::new(source, config.base_url.clone()),
            sink,
            config,
        }
    }

    /// The files `extract` would request, without fetching anything.
    pub fn planned_requests(&self) -> Vec<SourceRequest> {
        self.loader.plan(&self.config.range, &self.config.taxi_types)
    }
}

#[async_trait::async_trait]
impl<S: TripSource, K: TableSink> Pipeline for TripsPipeline<S, K> {
    async fn extract(&self) -> Result<LoadReport> {
        tracing::debug!(
            "Loading {:?} trips from {} to {}",
            self.config.taxi_types,
            self.config.range.start,
            self.config.range.end
        );
        Ok(self
            .loader
            .load(&self.config.range, &self.config.taxi_types)
            .await)
    }

    async fn load(&self, report: LoadReport) -> Result<RunSummary> {
        let status = report.status();
        let attempted = report.attempts.len();
        let failed = report.failed_count();
        let rows = report.table.len();

        tracing::debug!(
            "Writing {} rows to {}.{} ({:?})",
            rows,
            self.config.destination.dataset,
            self.config.destination.table,
            self.config.strategy
        );
        let location = self
            .sink
            .write_table(&report.table, &self.config.destination, self.config.strategy)
            .await?;

        Ok(RunSummary {
            location,
            rows,
            attempted,
            failed,
            status,
        })
    }
}
