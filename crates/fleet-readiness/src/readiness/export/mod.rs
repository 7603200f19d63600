mod columns;
mod row;

pub use columns::{
    feature_columns, is_excluded_feature, EXCLUDED_FEATURE_COLUMNS, EXPORT_COLUMNS,
    PREDICTION_COLUMN,
};
pub use row::ExportRow;

use super::ranking::RankedRecord;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to access readiness export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid readiness CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("readiness export columns do not match the contract (found {found:?})")]
    UnexpectedColumns { found: Vec<String> },
}

/// Write records as CSV with a header row, in the order given.
pub fn write_records<'a, W, I>(writer: W, records: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a RankedRecord>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(EXPORT_COLUMNS)?;

    let mut written = 0;
    for ranked in records {
        csv_writer.serialize(ExportRow::from(ranked))?;
        written += 1;
    }
    csv_writer.flush()?;

    debug!(rows = written, "readiness export written");
    Ok(written)
}

pub fn write_records_to_path<'a, P, I>(path: P, records: I) -> Result<usize, ExportError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a RankedRecord>,
{
    let file = File::create(path)?;
    write_records(file, records)
}

/// Parse an export back into rows, insisting on the exact column contract.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<ExportRow>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if !headers.iter().eq(EXPORT_COLUMNS.iter().copied()) {
        return Err(ExportError::UnexpectedColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut rows = Vec::new();
    for row in csv_reader.deserialize::<ExportRow>() {
        rows.push(row?);
    }
    Ok(rows)
}
