//! CSV import helper.
//!
//! Turns a CSV export (for example performance figures) into payload rows
//! that can be dispatched with `batch_call`. Deliberately small: one header
//! row, comma separated, double quotes for fields that contain commas.

use crate::client::{CallRequest, Payload};
use crate::{Error, ErrorContext, Result};
use serde_json::Value;

/// Parsed CSV: header names plus the cells of each data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `i` as a payload keyed by header name.
    pub fn row_payload(&self, i: usize) -> Option<Payload> {
        let row = self.rows.get(i)?;
        Some(
            self.headers
                .iter()
                .zip(row)
                .map(|(h, v)| (h.clone(), Value::String(v.clone())))
                .collect(),
        )
    }

    /// One request per row, all for `action`.
    pub fn into_requests(self, action: &str) -> Vec<CallRequest> {
        (0..self.rows.len())
            .filter_map(|i| self.row_payload(i))
            .map(|payload| CallRequest::new(action).payload(payload))
            .collect()
    }
}

/// Parse CSV text.
///
/// Blank lines are skipped, fields are trimmed and unquoted, and rows shorter
/// than the header are padded with empty strings. Extra trailing cells are
/// dropped.
pub fn parse_csv(text: &str) -> Result<CsvTable> {
    let mut lines = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty());

    let header_line = lines.next().ok_or_else(|| {
        Error::invalid_request(
            "CSV file is empty",
            ErrorContext::new().with_source("csv_import"),
        )
    })?;
    let headers = split_line(header_line);
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::invalid_request(
            "CSV header row has no column names",
            ErrorContext::new()
                .with_field_path("headers")
                .with_source("csv_import"),
        ));
    }

    let rows = lines
        .map(|line| {
            let mut cells = split_line(line);
            cells.resize(headers.len(), String::new());
            cells
        })
        .collect();

    Ok(CsvTable { headers, rows })
}

fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current).trim().to_string()),
            other => current.push(other),
        }
    }
    cells.push(current.trim().to_string());
    cells
}
