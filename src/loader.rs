//! Row loader for `DD/MM/YYYY,open,high,low,close` price files
//!
//! Each non-blank line becomes either a [`DayRecord`] or a [`LoadError`]
//! carrying its 1-based line number; no partially parsed record is ever
//! returned. Whether a bad row aborts the load or is skipped is the caller's
//! choice via [`InvalidRowPolicy`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::{DayRecord, PatternError, DATE_FORMAT};

/// Errors raised while turning input rows into records
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("line {line}: expected 5 fields, found {found}")]
    MalformedRow { line: usize, found: usize },

    #[error("line {line}: invalid date {value:?} (expected DD/MM/YYYY)")]
    InvalidDate { line: usize, value: String },

    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidDecimal {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: PatternError,
    },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Line the error refers to, if it came from a row
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::MalformedRow { line, .. }
            | LoadError::InvalidDate { line, .. }
            | LoadError::InvalidDecimal { line, .. }
            | LoadError::InvalidRecord { line, .. } => Some(*line),
            LoadError::Io(_) => None,
        }
    }
}

/// What to do with a row that fails to parse or validate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRowPolicy {
    /// Stop at the first bad row
    #[default]
    Abort,
    /// Record the error and keep going
    Skip,
}

/// Loader options
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// First line is a column header
    pub has_header: bool,
    pub on_invalid: InvalidRowPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            on_invalid: InvalidRowPolicy::Abort,
        }
    }
}

/// Records in input order plus the rows that were skipped
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<DayRecord>,
    pub rejected: Vec<LoadError>,
}

/// Parse one comma-separated row. `line` is used for error reporting only.
pub fn parse_row(line: usize, text: &str) -> Result<DayRecord, LoadError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [date, open, high, low, close] = fields.as_slice() else {
        return Err(LoadError::MalformedRow {
            line,
            found: fields.len(),
        });
    };

    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| LoadError::InvalidDate {
        line,
        value: date.to_string(),
    })?;
    let open = parse_decimal(line, "open", open)?;
    let high = parse_decimal(line, "high", high)?;
    let low = parse_decimal(line, "low", low)?;
    let close = parse_decimal(line, "close", close)?;

    DayRecord::new(date, open, high, low, close)
        .map_err(|source| LoadError::InvalidRecord { line, source })
}

/// Values that do not fit a `Decimal` without rounding are rejected.
fn parse_decimal(line: usize, field: &'static str, value: &str) -> Result<Decimal, LoadError> {
    let parsed = match value.split_once(['e', 'E']) {
        // from_scientific rounds an over-long mantissa
        Some((mantissa, _)) => {
            Decimal::from_str_exact(mantissa).and_then(|_| Decimal::from_scientific(value))
        }
        None => Decimal::from_str_exact(value),
    };
    parsed.map_err(|_| LoadError::InvalidDecimal {
        line,
        field,
        value: value.to_string(),
    })
}

/// Load records from any buffered reader.
///
/// Blank lines are ignored. Read failures always abort.
pub fn load_from_reader<R: BufRead>(reader: R, options: LoadOptions) -> Result<LoadReport, LoadError> {
    let mut report = LoadReport::default();

    for (i, text) in reader.lines().enumerate() {
        let text = text?;
        if i == 0 && options.has_header {
            continue;
        }
        if text.trim().is_empty() {
            continue;
        }

        match parse_row(i + 1, &text) {
            Ok(record) => report.records.push(record),
            Err(e) => match options.on_invalid {
                InvalidRowPolicy::Abort => return Err(e),
                InvalidRowPolicy::Skip => {
                    warn!(error = %e, "skipping invalid row");
                    report.rejected.push(e);
                }
            },
        }
    }

    debug!(
        records = report.records.len(),
        rejected = report.rejected.len(),
        "load complete"
    );
    Ok(report)
}

/// Load records from in-memory text
pub fn load_from_str(text: &str, options: LoadOptions) -> Result<LoadReport, LoadError> {
    load_from_reader(text.as_bytes(), options)
}

/// Load records from a file on disk
pub fn load_from_path<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<LoadReport, LoadError> {
    let file = File::open(path)?;
    load_from_reader(BufReader::new(file), options)
}
