// src/parser/mod.rs

//! Delimited-text feed parsing.
//!
//! The first line is the header; every later non-blank line becomes a
//! [`Record`] keyed by the normalized header names. Rows whose key field is
//! blank are dropped and counted in [`FeedDiagnostics`].

mod line;

pub use line::parse_line;

use serde::Serialize;

use crate::models::{Record, normalize_field};

/// What a parse observed, beyond the records themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedDiagnostics {
    /// Normalized header fields in column order
    pub fields: Vec<String>,
    /// Non-blank data rows seen
    pub data_rows: usize,
    /// Rows dropped because the key field was blank
    pub excluded_rows: usize,
}

impl FeedDiagnostics {
    /// Whether the header of `other` differs from this one.
    pub fn schema_changed(&self, other: &FeedDiagnostics) -> bool {
        self.fields != other.fields
    }
}

/// Records and diagnostics from one feed body.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub records: Vec<Record>,
    pub diagnostics: FeedDiagnostics,
}

/// Parse a whole feed body into records.
///
/// Fewer than two lines means there is no data, which is an empty result
/// rather than an error.
pub fn parse_feed(text: &str, key_field: &str) -> ParsedFeed {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return ParsedFeed::default();
    }

    let key_field = normalize_field(key_field);
    let fields: Vec<String> = parse_line(lines[0])
        .iter()
        .map(String::as_str)
        .map(normalize_field)
        .collect();

    let mut records = Vec::new();
    let mut data_rows = 0;
    let mut excluded_rows = 0;

    for line in &lines[1..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        data_rows += 1;

        let mut values = parse_line(line).into_iter();
        let record: Record = fields
            .iter()
            .map(|field| (field.clone(), values.next().unwrap_or_default()))
            .collect();

        if record.has_value(&key_field) {
            records.push(record);
        } else {
            excluded_rows += 1;
        }
    }

    if excluded_rows > 0 {
        log::debug!("Dropped {excluded_rows} of {data_rows} feed rows with a blank {key_field}");
    }

    ParsedFeed {
        records,
        diagnostics: FeedDiagnostics {
            fields,
            data_rows,
            excluded_rows,
        },
    }
}
