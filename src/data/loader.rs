//! Delimited record loading
//!
//! Reads the raw rows of a named resource file. The header row is dropped and
//! every remaining row is returned as plain strings, in file order.

use crate::{DataConfig, FeatureError, Result};
use std::fs::File;
use std::io::Read;

/// Fields of one input line, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRow {
    /// Fields a well-formed row carries: date, start time, end time, labels
    pub const FIELDS: usize = 4;

    pub fn new(line: u64, fields: Vec<String>) -> Self {
        RawRow { line, fields }
    }
}

/// Load all data rows of the named resource
pub fn load_rows(config: &DataConfig, name: &str) -> Result<Vec<RawRow>> {
    let path = config.resource_path(name);
    log::debug!("Loading records from {}", path.display());

    if !path.exists() {
        return Err(FeatureError::ResourceNotFound { path });
    }

    let file = File::open(&path)?;
    let rows = read_rows(file, config.delimiter_byte()?)?;
    log::info!("Loaded {} rows from {}", rows.len(), path.display());

    Ok(rows)
}

/// Read delimited rows from any reader, skipping the header row
pub fn read_rows<R: Read>(reader: R, delimiter: u8) -> Result<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(malformed)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields = record.iter().map(str::to_string).collect();
        rows.push(RawRow::new(line, fields));
    }

    Ok(rows)
}

fn malformed(err: csv::Error) -> FeatureError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => FeatureError::Io(e),
        _ => FeatureError::MalformedRow { line, message },
    }
}
