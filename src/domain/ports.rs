use crate::domain::model::{
    Destination, LoadReport, RunSummary, Strategy, TripRecord, TripTable, YearMonth,
};
use crate::config::RunConfig;
use crate::utils::error::Result;
use async_trait::async_trait;

/// One (taxi type, month) file to pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    pub taxi_type: String,
    pub period: YearMonth,
    pub url: String,
}

#[async_trait]
pub trait TripSource: Send + Sync {
    /// Rows come back already renamed to the canonical pickup/dropoff columns.
    async fn fetch(&self, request: &SourceRequest) -> Result<Vec<TripRecord>>;
}

pub trait TableSink: Send + Sync {
    fn write_table(
        &self,
        table: &TripTable,
        destination: &Destination,
        strategy: Strategy,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider {
    fn run_config(&self) -> Result<RunConfig>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<LoadReport>;
    async fn load(&self, report: LoadReport) -> Result<RunSummary>;
}
