use crate::core::{SourceRequest, TripRecord, TripSource};
use crate::utils::error::{EtlError, Result};
use arrow::array::{Array, ArrayRef, TimestampMicrosecondArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const READ_BATCH_SIZE: usize = 64 * 1024;

/// Provider-specific names of the two timestamp columns in a trip file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub pickup: String,
    pub dropoff: String,
}

impl ColumnPair {
    pub fn new(pickup: &str, dropoff: &str) -> Self {
        Self {
            pickup: pickup.to_string(),
            dropoff: dropoff.to_string(),
        }
    }

    /// Column names published for each taxi type. Unknown types fall back to
    /// the yellow-cab layout.
    pub fn for_taxi_type(taxi_type: &str) -> Self {
        match taxi_type {
            "green" => Self::new("lpep_pickup_datetime", "lpep_dropoff_datetime"),
            "fhv" => Self::new("pickup_datetime", "dropOff_datetime"),
            "fhvhv" => Self::new("pickup_datetime", "dropoff_datetime"),
            _ => Self::new("tpep_pickup_datetime", "tpep_dropoff_datetime"),
        }
    }
}

/// Built-in column names plus per-type overrides from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    overrides: HashMap<String, ColumnPair>,
}

impl ColumnMapping {
    pub fn new(overrides: HashMap<String, ColumnPair>) -> Self {
        Self { overrides }
    }

    pub fn columns_for(&self, taxi_type: &str) -> ColumnPair {
        self.overrides
            .get(taxi_type)
            .cloned()
            .unwrap_or_else(|| ColumnPair::for_taxi_type(taxi_type))
    }
}

pub struct HttpParquetSource {
    client: Client,
    columns: ColumnMapping,
}

impl HttpParquetSource {
    pub fn new(columns: ColumnMapping) -> Self {
        Self {
            client: Client::new(),
            columns,
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[async_trait::async_trait]
impl TripSource for HttpParquetSource {
    async fn fetch(&self, request: &SourceRequest) -> Result<Vec<TripRecord>> {
        let body = self.download(&request.url).await?;
        let columns = self.columns.columns_for(&request.taxi_type);
        decode_trips(body, &columns)
    }
}

/// Read only the pickup/dropoff columns out of a Parquet file and return them
/// as canonical trip records, in file order.
pub fn decode_trips(data: Bytes, columns: &ColumnPair) -> Result<Vec<TripRecord>> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)?;

    let mask = {
        let schema = builder.parquet_schema();
        let leaf_index = |name: &str| {
            schema
                .columns()
                .iter()
                .position(|c| c.name() == name)
                .ok_or_else(|| EtlError::SchemaError {
                    message: format!("column '{}' not found in source file", name),
                })
        };
        let pickup = leaf_index(columns.pickup.as_str())?;
        let dropoff = leaf_index(columns.dropoff.as_str())?;
        ProjectionMask::leaves(schema, [pickup, dropoff])
    };

    let reader = builder
        .with_projection(mask)
        .with_batch_size(READ_BATCH_SIZE)
        .build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let pickups = timestamp_column(&batch, &columns.pickup)?;
        let dropoffs = timestamp_column(&batch, &columns.dropoff)?;

        records.extend(
            pickups
                .into_iter()
                .zip(dropoffs)
                .map(|(pickup_datetime, dropoff_datetime)| TripRecord {
                    pickup_datetime,
                    dropoff_datetime,
                }),
        );
    }

    Ok(records)
}

// Older files store nanoseconds, newer ones microseconds; some carry a zone.
fn timestamp_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let column: &ArrayRef = batch
        .column_by_name(name)
        .ok_or_else(|| EtlError::SchemaError {
            message: format!("column '{}' missing from decoded batch", name),
        })?;

    let micros = cast(column.as_ref(), &DataType::Timestamp(TimeUnit::Microsecond, None))?;
    let micros = micros
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .ok_or_else(|| EtlError::SchemaError {
            message: format!("column '{}' is not a timestamp column", name),
        })?;

    Ok((0..micros.len())
        .map(|i| {
            if micros.is_null(i) {
                None
            } else {
                micros.value_as_datetime(i)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, StringArray, TimestampNanosecondArray};
    use arrow::datatypes::{Field, Schema};
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn micros(dt: NaiveDateTime) -> i64 {
        dt.and_utc().timestamp_micros()
    }

    fn to_parquet(batch: RecordBatch) -> Bytes {
        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        Bytes::from(buf)
    }

    fn yellow_file(rows: &[(Option<NaiveDateTime>, Option<NaiveDateTime>)]) -> Bytes {
        let schema = Arc::new(Schema::new(vec![
            Field::new("VendorID", DataType::Int32, true),
            Field::new(
                "tpep_pickup_datetime",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                true,
            ),
            Field::new(
                "tpep_dropoff_datetime",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                true,
            ),
            Field::new("store_and_fwd_flag", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(vec![1; rows.len()])),
                Arc::new(TimestampMicrosecondArray::from(
                    rows.iter().map(|r| r.0.map(micros)).collect::<Vec<_>>(),
                )),
                Arc::new(TimestampMicrosecondArray::from(
                    rows.iter().map(|r| r.1.map(micros)).collect::<Vec<_>>(),
                )),
                Arc::new(StringArray::from(vec!["N"; rows.len()])),
            ],
        )
        .unwrap();
        to_parquet(batch)
    }

    #[test]
    fn test_column_pairs_per_taxi_type() {
        assert_eq!(
            ColumnPair::for_taxi_type("yellow").pickup,
            "tpep_pickup_datetime"
        );
        assert_eq!(
            ColumnPair::for_taxi_type("green").dropoff,
            "lpep_dropoff_datetime"
        );
        assert_eq!(ColumnPair::for_taxi_type("fhv").dropoff, "dropOff_datetime");
        assert_eq!(
            ColumnPair::for_taxi_type("limo"),
            ColumnPair::for_taxi_type("yellow")
        );
    }

    #[test]
    fn test_mapping_overrides_take_precedence() {
        let mut overrides = HashMap::new();
        overrides.insert("green".to_string(), ColumnPair::new("pu", "do"));
        let mapping = ColumnMapping::new(overrides);

        assert_eq!(mapping.columns_for("green"), ColumnPair::new("pu", "do"));
        assert_eq!(
            mapping.columns_for("yellow"),
            ColumnPair::for_taxi_type("yellow")
        );
    }

    #[test]
    fn test_decode_selects_and_renames_timestamps() {
        let data = yellow_file(&[
            (Some(at(1, 8, 0)), Some(at(1, 8, 25))),
            (Some(at(2, 23, 50)), Some(at(3, 0, 10))),
        ]);

        let records = decode_trips(data, &ColumnPair::for_taxi_type("yellow")).unwrap();

        assert_eq!(
            records,
            vec![
                TripRecord::new(at(1, 8, 0), at(1, 8, 25)),
                TripRecord::new(at(2, 23, 50), at(3, 0, 10)),
            ]
        );
    }

    #[test]
    fn test_decode_keeps_null_cells() {
        let data = yellow_file(&[(Some(at(1, 8, 0)), None), (None, Some(at(1, 9, 0)))]);

        let records = decode_trips(data, &ColumnPair::for_taxi_type("yellow")).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].dropoff_datetime, None);
        assert_eq!(records[1].pickup_datetime, None);
        assert_eq!(records[1].dropoff_datetime, Some(at(1, 9, 0)));
    }

    #[test]
    fn test_decode_nanosecond_timestamps_with_zone() {
        let ns_type = DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into()));
        let schema = Arc::new(Schema::new(vec![
            Field::new("lpep_pickup_datetime", ns_type.clone(), true),
            Field::new("lpep_dropoff_datetime", ns_type, true),
        ]));
        let pickup = micros(at(5, 12, 0)) * 1_000;
        let dropoff = micros(at(5, 12, 30)) * 1_000;
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(TimestampNanosecondArray::from(vec![pickup]).with_timezone("UTC")),
                Arc::new(TimestampNanosecondArray::from(vec![dropoff]).with_timezone("UTC")),
            ],
        )
        .unwrap();

        let records = decode_trips(to_parquet(batch), &ColumnPair::for_taxi_type("green")).unwrap();

        assert_eq!(records, vec![TripRecord::new(at(5, 12, 0), at(5, 12, 30))]);
    }

    #[test]
    fn test_decode_missing_column_is_schema_error() {
        let data = yellow_file(&[(Some(at(1, 8, 0)), Some(at(1, 8, 25)))]);

        let err = decode_trips(data, &ColumnPair::for_taxi_type("green")).unwrap_err();

        assert!(matches!(err, EtlError::SchemaError { .. }));
        assert!(err.to_string().contains("lpep_pickup_datetime"));
    }

    #[test]
    fn test_decode_rejects_non_parquet_bytes() {
        let err = decode_trips(
            Bytes::from_static(b"<html>Not Found</html>"),
            &ColumnPair::for_taxi_type("yellow"),
        )
        .unwrap_err();

        assert!(matches!(err, EtlError::ParquetError(_)));
    }
}
