//! Output formatting utilities for MCP tools.
//!
//! Shared helpers for turning warehouse values into the plain text the tools return.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value as JsonValue;

/// Render a value for display in text output.
pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(arr) => serde_json::to_string(arr).unwrap_or_default(),
        JsonValue::Object(obj) => serde_json::to_string(obj).unwrap_or_default(),
    }
}

/// Render a count with thousands separators (`1234567` -> `1,234,567`).
///
/// Integral strings are accepted too; anything else is shown as-is.
pub fn format_count(value: &JsonValue) -> String {
    let parsed = match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) => group_thousands(n),
        None => format_value(value),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Render a warehouse timestamp as `YYYY-MM-DD HH:MM:SS[.fff]`.
///
/// Accepts RFC 3339 timestamps and zone-less ISO timestamps; other values are shown as-is.
pub fn format_timestamp(value: &JsonValue) -> String {
    let JsonValue::String(raw) = value else {
        return format_value(value);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.format("%Y-%m-%d %H:%M:%S%.f").to_string();
    }
    raw.clone()
}
