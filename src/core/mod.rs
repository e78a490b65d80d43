pub mod etl;
pub mod loader;
pub mod months;
pub mod pipeline;
pub mod source;

pub use crate::domain::model::{
    DateRange, Destination, FetchAttempt, FetchOutcome, LoadReport, LoadStatus, RunSummary,
    Strategy, TripRecord, TripTable, YearMonth,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, SourceRequest, TableSink, TripSource};
pub use crate::utils::error::Result;
