// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Positional-row normalization against a fixed table schema.
//!
//! The raw exports are headerless and irregular: rows can be wider or
//! narrower than the schema. Normalization is total — every row in
//! yields exactly one named record out. Extra columns are discarded,
//! missing trailing columns become empty strings, and unparseable
//! dates become empty strings rather than errors.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

/// A named, schema-conformant row.
pub type NormalizedRecord = BTreeMap<String, String>;

/// The timestamp format the CRM export emits.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column layout of one raw tabular source.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    /// Ordered column names; also the expected row width.
    pub columns: &'static [&'static str],
    /// Columns holding timestamps to coerce through [`DATE_FORMAT`].
    pub date_fields: &'static [&'static str],
}

impl TableSchema {
    /// Index of a column name, if the schema has it.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }
}

/// Normalize one positional row: truncate/pad to the schema width,
/// name the columns, coerce date fields.
pub fn normalize_row(row: &[String], schema: &TableSchema) -> NormalizedRecord {
    let mut record = NormalizedRecord::new();
    for (index, column) in schema.columns.iter().enumerate() {
        let raw = row.get(index).map(String::as_str).unwrap_or_default();
        let value = if schema.date_fields.contains(column) {
            coerce_date(raw)
        } else {
            raw.to_string()
        };
        record.insert((*column).to_string(), value);
    }
    record
}

/// Normalize a sequence of raw rows against a schema.
pub fn normalize(rows: &[Vec<String>], schema: &TableSchema) -> Vec<NormalizedRecord> {
    rows.iter().map(|row| normalize_row(row, schema)).collect()
}

/// Parse a raw timestamp with the export's format; empty string on
/// failure, never an error.
pub fn coerce_date(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(parsed) => parsed.format(DATE_FORMAT).to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: TableSchema = TableSchema {
        columns: &["id", "name", "created_at"],
        date_fields: &["created_at"],
    };

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn exact_width_row_is_named_in_order() {
        let record = normalize_row(&row(&["1", "Amine", "2024-03-01 09:30:00"]), &SCHEMA);
        assert_eq!(record["id"], "1");
        assert_eq!(record["name"], "Amine");
        assert_eq!(record["created_at"], "2024-03-01 09:30:00");
    }

    #[test]
    fn extra_columns_are_discarded() {
        let record = normalize_row(
            &row(&["1", "Amine", "2024-03-01 09:30:00", "surplus", "more"]),
            &SCHEMA,
        );
        assert_eq!(record.len(), SCHEMA.columns.len());
        assert!(!record.values().any(|v| v == "surplus"));
    }

    #[test]
    fn missing_trailing_columns_become_empty_strings() {
        let record = normalize_row(&row(&["1"]), &SCHEMA);
        assert_eq!(record["name"], "");
        assert_eq!(record["created_at"], "");
    }

    #[test]
    fn malformed_dates_become_empty_never_error() {
        for bad in ["yesterday", "2024-13-45 99:99:99", "2024-03-01", ""] {
            assert_eq!(coerce_date(bad), "", "input: {bad}");
        }
    }

    #[test]
    fn well_formed_date_is_preserved() {
        assert_eq!(
            coerce_date("2024-03-01 09:30:00"),
            "2024-03-01 09:30:00"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let rows = vec![
            row(&["1", "Amine", "2024-03-01 09:30:00", "extra"]),
            row(&["2"]),
            row(&["3", "Sana", "not a date"]),
        ];
        let first = normalize(&rows, &SCHEMA);
        let second = normalize(&rows, &SCHEMA);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
