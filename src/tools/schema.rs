//! Schema and summary tools.
//!
//! This module implements the `get_table_schema` and `get_data_summary` MCP tools.
//! Bronze tables follow the `<name>_bronze` naming convention; the summary comes from
//! the `bronze_summary` view, which is maintained outside this server.

use crate::config::WarehouseConfig;
use crate::db::ConnectionManager;
use crate::error::{DbResult, ToolError, ToolResult};
use crate::models::{ColumnDefinition, ResultSet, SummaryEntry};
use crate::tools::format::{format_count, format_timestamp, format_value};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the get_table_schema tool.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSchemaInput {
    /// Table name without the `_bronze` suffix (teams, games, plays, ...)
    #[serde(default)]
    pub table_name: String,
}

/// Render `DESCRIBE TABLE` rows, one `name: type (detail)` line per column.
pub fn render_table_schema(table_name: &str, result: &ResultSet) -> String {
    let mut text = format!("Schema for {}_bronze:\n\n", table_name);
    for row in &result.rows {
        let column = ColumnDefinition::from_row(row);
        text.push_str(&format!(
            "{}: {} ({})\n",
            column.name,
            column.data_type,
            column.detail_or_nullable()
        ));
    }
    text
}

/// Render the summary view, one paragraph per tracked table.
pub fn render_data_summary(result: &ResultSet) -> DbResult<String> {
    let mut text = String::from("CFDB Data Summary:\n\n");
    for record in result.records() {
        let entry = SummaryEntry::from_record(&record)?;
        text.push_str(&format!("Table: {}\n", format_value(&entry.table_name)));
        text.push_str(&format!("  Records: {}\n", format_count(&entry.record_count)));
        text.push_str(&format!("  Files: {}\n", format_value(&entry.file_count)));
        text.push_str(&format!(
            "  Latest Ingestion: {}\n\n",
            format_timestamp(&entry.latest_ingestion)
        ));
    }
    Ok(text)
}

/// Handler for schema and summary tools.
pub struct SchemaToolHandler {
    connection_manager: Arc<ConnectionManager>,
    warehouse: Arc<WarehouseConfig>,
}

impl SchemaToolHandler {
    /// Create a new schema tool handler.
    pub fn new(connection_manager: Arc<ConnectionManager>, warehouse: Arc<WarehouseConfig>) -> Self {
        Self {
            connection_manager,
            warehouse,
        }
    }

    /// Describe `<catalog>.<schema>.<table_name>_bronze`.
    pub async fn get_table_schema(&self, input: TableSchemaInput) -> ToolResult<String> {
        let mut session = self
            .connection_manager
            .connected()
            .await
            .map_err(ToolError::Connection)?;

        let statement = format!(
            "DESCRIBE TABLE {}",
            self.warehouse.bronze_table(&input.table_name)
        );
        let result = session
            .execute(&statement)
            .await
            .map_err(|source| ToolError::Schema {
                table_name: input.table_name.clone(),
                source,
            })?;

        info!(
            table = %input.table_name,
            columns = result.row_count(),
            "Table described"
        );
        Ok(render_table_schema(&input.table_name, &result))
    }

    /// Summarize every bronze table from the summary view.
    pub async fn get_data_summary(&self) -> ToolResult<String> {
        let mut session = self
            .connection_manager
            .connected()
            .await
            .map_err(ToolError::Connection)?;

        let statement = format!("SELECT * FROM {}", self.warehouse.summary_view());
        let result = session
            .execute(&statement)
            .await
            .map_err(ToolError::Summary)?;

        info!(tables = result.row_count(), "Data summary fetched");
        render_data_summary(&result).map_err(ToolError::Summary)
    }
}
