//! Dataset Module - CSV input
//!
//! Reference observations feed the dashboard aggregates; bulk uploads
//! are turned into stored observations.

pub mod csv;
pub mod reference;
pub mod bulk;

use std::path::PathBuf;

use thiserror::Error;

pub use bulk::BulkRow;
pub use csv::{CsvTable, Record};
pub use reference::ReferenceStats;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file is not valid UTF-8")]
    Encoding,

    #[error("file has no header row")]
    MissingHeader,

    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("line {line}: column '{column}' is empty")]
    EmptyField { line: usize, column: String },

    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    BadNumber { line: usize, column: String, value: String },

    #[error("line {line}: column '{column}' has unknown value '{value}'")]
    BadLabel { line: usize, column: String, value: String },

    #[error("line {line}: {message}")]
    Invalid { line: usize, message: String },
}

/// Integer cell; spreadsheets sometimes export whole numbers as `5.0`
pub(crate) fn parse_int(record: &Record<'_>, column: &str) -> Result<Option<i32>, DatasetError> {
    let Some(value) = record.get(column) else {
        return Ok(None);
    };

    if let Ok(n) = value.parse::<i32>() {
        return Ok(Some(n));
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(f as i32)),
        _ => Err(DatasetError::BadNumber {
            line: record.line(),
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}

pub(crate) fn require<'a>(record: &Record<'a>, column: &str) -> Result<&'a str, DatasetError> {
    record.get(column).ok_or_else(|| DatasetError::EmptyField {
        line: record.line(),
        column: column.to_string(),
    })
}
