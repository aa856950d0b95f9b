//! Query-related data models.
//!
//! This module defines the result set returned by a warehouse session and the
//! row limits applied to ad-hoc queries.

use serde_json::Value as JsonValue;

/// Default `LIMIT` appended to ad-hoc queries.
pub const DEFAULT_ROW_LIMIT: i64 = 100;

/// Number of rows shown in a query response, independent of the SQL limit.
pub const DISPLAY_ROW_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    /// Databricks type name (e.g., "INT", "STRING", "DECIMAL")
    pub type_name: String,
}

impl ColumnMetadata {
    /// Create new column metadata.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Everything a statement produced: column descriptions plus all fetched rows.
///
/// Rows are positional and line up with `columns`. Statements without a result
/// (e.g. `USE CATALOG`) produce an empty set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnMetadata>, rows: Vec<Vec<JsonValue>>) -> Self {
        Self { columns, rows }
    }

    /// Column names in warehouse order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pair every row positionally with the column names.
    ///
    /// A column name that appears twice keeps the value of its last occurrence.
    pub fn records(&self) -> Vec<serde_json::Map<String, JsonValue>> {
        self.rows.iter().map(|row| self.record(row)).collect()
    }

    fn record(&self, row: &[JsonValue]) -> serde_json::Map<String, JsonValue> {
        self.columns
            .iter()
            .zip(row)
            .map(|(column, value)| (column.name.clone(), value.clone()))
            .collect()
    }
}
