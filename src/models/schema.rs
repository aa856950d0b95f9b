//! Schema-related data models.
//!
//! This module defines the rows produced by `DESCRIBE TABLE` and by the
//! `bronze_summary` view.

use crate::error::{DbError, DbResult};
use serde_json::Value as JsonValue;

/// One line of `DESCRIBE TABLE` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: String,
    /// Third column reported by the warehouse (the column comment on Databricks).
    pub detail: Option<String>,
}

impl ColumnDefinition {
    /// Build from a positional `DESCRIBE TABLE` row (col_name, data_type, comment).
    pub fn from_row(row: &[JsonValue]) -> Self {
        let text = |index: usize| row.get(index).and_then(cell_text);
        Self {
            name: text(0).unwrap_or_default(),
            data_type: text(1).unwrap_or_default(),
            detail: text(2).filter(|s| !s.is_empty()),
        }
    }

    /// The reported detail, or `nullable` when the warehouse reported none.
    pub fn detail_or_nullable(&self) -> &str {
        self.detail.as_deref().unwrap_or("nullable")
    }
}

/// One row of the externally maintained `bronze_summary` view.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub table_name: JsonValue,
    pub record_count: JsonValue,
    pub file_count: JsonValue,
    pub latest_ingestion: JsonValue,
}

impl SummaryEntry {
    /// Build from a column->value record. Every field of the view contract is required.
    pub fn from_record(record: &serde_json::Map<String, JsonValue>) -> DbResult<Self> {
        let field = |name: &str| {
            record.get(name).cloned().ok_or_else(|| {
                DbError::database(
                    format!("bronze_summary has no column '{}'", name),
                    None,
                    "The summary view must expose table_name, record_count, file_count and latest_ingestion",
                )
            })
        };
        Ok(Self {
            table_name: field("table_name")?,
            record_count: field("record_count")?,
            file_count: field("file_count")?,
            latest_ingestion: field("latest_ingestion")?,
        })
    }
}

fn cell_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
