//! CSV ingest of one open-loop experiment.
//!
//! Expected layout: a header row with (at least) `u` and `y` columns, one
//! sample per row, in time order. Other columns (e.g. `t`) are ignored.
//!
//! Unlike a point cloud, a time series cannot drop a bad row without shifting
//! every later sample, so any row-level error rejects the whole file. All row
//! errors are collected first so the message lists every offending line.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::error::AppError;

/// How many row errors are spelled out in the failure message.
const MAX_REPORTED_ROW_ERRORS: usize = 5;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Recorded signals, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSignals {
    pub u: Vec<f64>,
    pub y: Vec<f64>,
}

impl RecordedSignals {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Load an experiment CSV from disk.
pub fn load_signals(path: &Path) -> Result<RecordedSignals, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_signals(file)
}

/// Parse an experiment CSV from any reader.
pub fn read_signals<R: Read>(source: R) -> Result<RecordedSignals, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let u_idx = *header_map
        .get("u")
        .ok_or_else(|| AppError::new(2, "Missing required column: `u`"))?;
    let y_idx = *header_map
        .get("y")
        .ok_or_else(|| AppError::new(2, "Missing required column: `y`"))?;

    let mut signals = RecordedSignals { u: Vec::new(), y: Vec::new() };
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match (parse_sample(&record, u_idx, "u"), parse_sample(&record, y_idx, "y")) {
            (Ok(u), Ok(y)) => {
                signals.u.push(u);
                signals.y.push(y);
            }
            (Err(message), _) | (_, Err(message)) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        let listed: Vec<String> = row_errors
            .iter()
            .take(MAX_REPORTED_ROW_ERRORS)
            .map(|e| format!("line {}: {}", e.line, e.message))
            .collect();
        let more = row_errors.len().saturating_sub(MAX_REPORTED_ROW_ERRORS);
        let suffix = if more > 0 { format!(" (+{more} more)") } else { String::new() };
        return Err(AppError::new(
            2,
            format!("{} invalid row(s): {}{suffix}", row_errors.len(), listed.join("; ")),
        ));
    }

    if signals.is_empty() {
        return Err(AppError::new(2, "CSV contains no samples."));
    }

    tracing::debug!(samples = signals.len(), "experiment CSV loaded");
    Ok(signals)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_sample(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` value."))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value."));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_columns_by_name_in_any_order() {
        let text = "\u{feff}t, Y ,u\n0.00,0.0,1\n0.01,0.5,1\n0.02,0.95,0\n";
        let s = read_signals(text.as_bytes()).unwrap();
        assert_eq!(s.u, vec![1.0, 1.0, 0.0]);
        assert_eq!(s.y, vec![0.0, 0.5, 0.95]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let err = read_signals("t,u\n0,1\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`y`"));
    }

    #[test]
    fn bad_rows_reject_the_file_and_are_listed() {
        let text = "u,y\n1,0\nx,0.5\n1,\n1,0.9\n";
        let err = read_signals(text.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert_eq!(err.exit_code(), 2);
        assert!(msg.contains("2 invalid row(s)"), "{msg}");
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("line 4"), "{msg}");
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(read_signals("u,y\n".as_bytes()).is_err());
    }
}
