use crate::core::{Destination, Strategy, TableSink, TripTable};
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Local stand-in for the warehouse: one CSV file per destination table.
#[derive(Debug, Clone)]
pub struct LocalTableSink {
    base_path: String,
}

impl LocalTableSink {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn table_path(&self, destination: &Destination) -> PathBuf {
        Path::new(&self.base_path)
            .join(&destination.dataset)
            .join(format!("{}.csv", destination.table))
    }
}

fn format_cell(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

impl TableSink for LocalTableSink {
    async fn write_table(
        &self,
        table: &TripTable,
        destination: &Destination,
        strategy: Strategy,
    ) -> Result<String> {
        let full_path = self.table_path(destination);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = match strategy {
            Strategy::Append => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&full_path)?,
            Strategy::Replace => OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&full_path)?,
        };
        // 新檔或覆寫時才寫表頭
        let write_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(table.column_names())?;
        }
        for record in table.records() {
            writer.write_record([
                format_cell(record.pickup_datetime),
                format_cell(record.dropoff_datetime),
            ])?;
        }
        writer.flush()?;

        tracing::debug!(
            "Wrote {} rows to {} ({:?})",
            table.len(),
            full_path.display(),
            strategy
        );
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TripRecord;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn table(hours: &[u32]) -> TripTable {
        let mut table = TripTable::new();
        table.append(
            hours
                .iter()
                .map(|&h| {
                    let pickup = NaiveDate::from_ymd_opt(2023, 1, 1)
                        .unwrap()
                        .and_hms_opt(h, 0, 0)
                        .unwrap();
                    TripRecord::new(pickup, pickup + chrono::Duration::minutes(15))
                })
                .collect(),
        );
        table
    }

    #[tokio::test]
    async fn test_append_creates_file_with_header_then_appends() {
        let temp_dir = TempDir::new().unwrap();
        let sink = LocalTableSink::new(temp_dir.path().to_str().unwrap().to_string());
        let destination = Destination::default();

        let location = sink
            .write_table(&table(&[8]), &destination, Strategy::Append)
            .await
            .unwrap();
        sink.write_table(&table(&[9, 10]), &destination, Strategy::Append)
            .await
            .unwrap();

        assert!(location.ends_with("trips.csv"));
        let content = std::fs::read_to_string(sink.table_path(&destination)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "pickup_datetime,dropoff_datetime",
                "2023-01-01 08:00:00,2023-01-01 08:15:00",
                "2023-01-01 09:00:00,2023-01-01 09:15:00",
                "2023-01-01 10:00:00,2023-01-01 10:15:00",
            ]
        );
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_rows() {
        let temp_dir = TempDir::new().unwrap();
        let sink = LocalTableSink::new(temp_dir.path().to_str().unwrap().to_string());
        let destination = Destination {
            dataset: "raw".to_string(),
            table: "taxi".to_string(),
        };

        sink.write_table(&table(&[8, 9]), &destination, Strategy::Append)
            .await
            .unwrap();
        sink.write_table(&table(&[11]), &destination, Strategy::Replace)
            .await
            .unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join("raw/taxi.csv")).unwrap();
        assert_eq!(
            content,
            "pickup_datetime,dropoff_datetime\n2023-01-01 11:00:00,2023-01-01 11:15:00\n"
        );
    }

    #[tokio::test]
    async fn test_empty_table_writes_header_and_nulls_as_empty_cells() {
        let temp_dir = TempDir::new().unwrap();
        let sink = LocalTableSink::new(temp_dir.path().to_str().unwrap().to_string());
        let destination = Destination::default();

        sink.write_table(&TripTable::new(), &destination, Strategy::Append)
            .await
            .unwrap();
        let content = std::fs::read_to_string(sink.table_path(&destination)).unwrap();
        assert_eq!(content, "pickup_datetime,dropoff_datetime\n");

        let mut with_null = TripTable::new();
        with_null.append(vec![TripRecord {
            pickup_datetime: None,
            dropoff_datetime: table(&[7]).records()[0].dropoff_datetime,
        }]);
        sink.write_table(&with_null, &destination, Strategy::Append)
            .await
            .unwrap();

        let content = std::fs::read_to_string(sink.table_path(&destination)).unwrap();
        assert!(content.ends_with("\n,2023-01-01 07:15:00\n"));
    }
}
