use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use super::SignalParser;
use crate::data::model::{Metadata, SignalRecord};
use crate::error::{Error, Result};

pub const FREQUENCY_COLUMN: &str = "frequency";
pub const MAGNITUDE_COLUMN: &str = "magnitude_db";
pub const PHASE_COLUMN: &str = "phase_deg";

/// Schema metadata keys the Arrow/Parquet writers add for themselves.
const RESERVED_PREFIX: &str = "ARROW:";

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Arrow view of a record: `frequency`, `magnitude_db` and (only when the
/// record has phase) `phase_deg`, all Float64. Record metadata rides along as
/// schema metadata.
pub fn record_batch(record: &SignalRecord) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new(FREQUENCY_COLUMN, DataType::Float64, false),
        Field::new(MAGNITUDE_COLUMN, DataType::Float64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(record.frequency().to_vec())),
        Arc::new(Float64Array::from(record.magnitude_db().to_vec())),
    ];
    if let Some(phase) = record.phase_deg() {
        fields.push(Field::new(PHASE_COLUMN, DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(phase.to_vec())));
    }

    let metadata: HashMap<String, String> = record
        .metadata()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let schema = Arc::new(Schema::new(fields).with_metadata(metadata));
    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Persist a canonical record as a single-row-group Parquet file.
pub fn write_archive(record: &SignalRecord, path: &Path) -> Result<()> {
    let batch = record_batch(record)?;
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    log::info!("wrote {} samples to {}", record.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads archives produced by [`write_archive`] (or any Parquet file with
/// the same column names).
pub struct ArchiveParser;

impl SignalParser for ArchiveParser {
    fn parse(&self, source: &[u8]) -> Result<SignalRecord> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(source))?;
        let schema = builder.schema().clone();

        for required in [FREQUENCY_COLUMN, MAGNITUDE_COLUMN] {
            if schema.field_with_name(required).is_err() {
                return Err(Error::MissingData(format!("archive has no '{required}' column")));
            }
        }
        let has_phase = schema.field_with_name(PHASE_COLUMN).is_ok();

        let metadata: Metadata = schema
            .metadata()
            .iter()
            .filter(|(k, _)| !k.starts_with(RESERVED_PREFIX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut frequency = Vec::new();
        let mut magnitude_db = Vec::new();
        let mut phase_deg = has_phase.then(Vec::new);

        for batch in builder.build()? {
            let batch = batch?;
            frequency.extend(float_column(&batch, FREQUENCY_COLUMN)?);
            magnitude_db.extend(float_column(&batch, MAGNITUDE_COLUMN)?);
            if let Some(phase) = phase_deg.as_mut() {
                phase.extend(float_column(&batch, PHASE_COLUMN)?);
            }
        }

        SignalRecord::new(metadata, frequency, magnitude_db, phase_deg)
    }
}

/// Float64 or Float32 column as `f64`; nulls become NaN and fail record validation.
fn float_column(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| Error::MissingData(format!("archive batch has no '{name}' column")))?;

    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else {
        Err(Error::UnsupportedFormat(format!(
            "archive column '{name}' has type {:?}, expected Float64 or Float32",
            col.data_type()
        )))
    }
}
