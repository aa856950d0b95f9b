//! Data models for the CFDB MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod query;
pub mod schema;

// Re-export commonly used types
pub use query::{ColumnMetadata, DEFAULT_ROW_LIMIT, DISPLAY_ROW_LIMIT, ResultSet};
pub use schema::{ColumnDefinition, SummaryEntry};
