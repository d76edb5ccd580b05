//! Export the normalized table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: UTF-8, a header row, ISO dates, and shortest round-trip floats.
//! Exported climate files can be read back with `read_series_csv`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::data::FetchError;
use crate::data::sources::ColumnPolicy;
use crate::domain::{Series, UserRecord};
use crate::error::AppError;
use crate::io::ingest::normalize_csv;

/// Write `date,value` rows.
pub fn write_series_csv<W: Write>(writer: W, series: &Series) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    if series.is_empty() {
        wtr.write_record(["date", "value"])?;
    }
    for obs in series {
        wtr.serialize(obs)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `date,summer_avg_temp_C,math_score` rows.
pub fn write_records_csv<W: Write>(writer: W, records: &[UserRecord]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(["date", "summer_avg_temp_C", "math_score"])?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parse a previously exported `date,value` file.
pub fn read_series_csv(text: &str) -> Result<Series, FetchError> {
    // Exported data was already filtered when it was fetched; don't re-filter.
    normalize_csv(text, &ColumnPolicy::EXPORTED, NaiveDate::MAX).map(|t| t.series)
}

/// Export a series to a file on disk.
pub fn export_series(path: &Path, series: &Series) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series_csv(file, series)
        .map_err(|e| AppError::io(format!("Failed to write export CSV '{}': {e}", path.display())))
}

/// Export study records to a file on disk.
pub fn export_records(path: &Path, records: &[UserRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_records_csv(file, records)
        .map_err(|e| AppError::io(format!("Failed to write export CSV '{}': {e}", path.display())))
}
