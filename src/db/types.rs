//! Databricks type mappings.
//!
//! The Statement Execution API returns every cell of a `JSON_ARRAY` result as a
//! string (or null). This module turns those strings back into JSON values:
//!
//! 1. `TypeCategory` classifies the column type reported in the result manifest
//! 2. `decode_cell` converts the raw string according to that category
//!
//! Only integers, floats and booleans become JSON-native values. Decimals, dates,
//! timestamps, intervals and complex types stay strings so no precision is lost.

use crate::models::ColumnMetadata;
use serde_json::Value as JsonValue;

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for Databricks column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Boolean,
    /// Everything rendered as text: STRING, DECIMAL, DATE, TIMESTAMP, BINARY, ...
    Text,
}

/// Classify a Databricks `type_name` into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    match type_name.trim().to_uppercase().as_str() {
        "BYTE" | "TINYINT" | "SHORT" | "SMALLINT" | "INT" | "INTEGER" | "LONG" | "BIGINT" => {
            TypeCategory::Integer
        }
        "FLOAT" | "REAL" | "DOUBLE" => TypeCategory::Float,
        "BOOLEAN" => TypeCategory::Boolean,
        _ => TypeCategory::Text,
    }
}

// =============================================================================
// Value Decoding
// =============================================================================

/// Decode one raw cell into a JSON value.
///
/// Values that do not parse as their declared category fall back to the raw string.
pub fn decode_cell(raw: Option<&str>, category: TypeCategory) -> JsonValue {
    let Some(raw) = raw else {
        return JsonValue::Null;
    };

    match category {
        TypeCategory::Integer => raw
            .parse::<i64>()
            .map(JsonValue::from)
            .unwrap_or_else(|_| JsonValue::String(raw.to_string())),
        TypeCategory::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(raw.to_string())),
        TypeCategory::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" => JsonValue::Bool(true),
            "false" => JsonValue::Bool(false),
            _ => JsonValue::String(raw.to_string()),
        },
        TypeCategory::Text => JsonValue::String(raw.to_string()),
    }
}

/// Decode a raw `data_array` row using the column metadata from the manifest.
///
/// Rows shorter than the column list are padded with nulls.
pub fn decode_row(columns: &[ColumnMetadata], raw: Vec<Option<String>>) -> Vec<JsonValue> {
    let mut cells = raw.into_iter();
    columns
        .iter()
        .map(|column| {
            let cell = cells.next().flatten();
            decode_cell(cell.as_deref(), categorize_type(&column.type_name))
        })
        .collect()
}
