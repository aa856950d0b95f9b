//! Query execution tool.
//!
//! This module implements the `query_cfdb_data` MCP tool. The caller's SQL is passed
//! through untouched apart from the `LIMIT` clause appended to it; it runs after the
//! session has been pointed at the CFDB catalog and bronze schema.

use crate::config::WarehouseConfig;
use crate::db::{ConnectionManager, SessionGuard};
use crate::error::{DbError, DbResult, ToolError, ToolResult};
use crate::models::{DEFAULT_ROW_LIMIT, DISPLAY_ROW_LIMIT, ResultSet};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

fn default_limit() -> i64 {
    DEFAULT_ROW_LIMIT
}

/// Input for the query_cfdb_data tool.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryInput {
    /// SQL query to execute against CFDB data
    #[serde(default)]
    pub query: String,
    /// Maximum number of rows to return. Default: 100
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// JSON body of a query response.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    /// The query as the caller wrote it
    pub query: String,
    /// Number of rows fetched, before display truncation
    pub row_count: usize,
    pub columns: Vec<String>,
    /// First rows of the result as column -> value maps
    pub data: Vec<serde_json::Map<String, JsonValue>>,
}

impl QueryOutput {
    /// Build the response, keeping at most `DISPLAY_ROW_LIMIT` rows.
    pub fn from_result(query: impl Into<String>, result: &ResultSet) -> Self {
        let mut data = result.records();
        data.truncate(DISPLAY_ROW_LIMIT);
        Self {
            query: query.into(),
            row_count: result.row_count(),
            columns: result.column_names(),
            data,
        }
    }

    /// Render as the text block returned to the caller.
    pub fn render(&self) -> DbResult<String> {
        let body = serde_json::to_string_pretty(self)
            .map_err(|e| DbError::internal(format!("Failed to serialize results: {}", e)))?;
        Ok(format!("Query Results:\n{}", body))
    }
}

/// Append the row limit to the caller's SQL.
///
/// Plain concatenation on a new line: a trailing line comment is harmless, but SQL
/// ending in a semicolon or an unclosed block comment will not compose cleanly.
pub fn compose_query(query: &str, limit: i64) -> String {
    format!("{}\nLIMIT {}", query, limit)
}

/// Handler for query execution.
pub struct QueryToolHandler {
    connection_manager: Arc<ConnectionManager>,
    warehouse: Arc<WarehouseConfig>,
}

impl QueryToolHandler {
    /// Create a new query tool handler.
    pub fn new(connection_manager: Arc<ConnectionManager>, warehouse: Arc<WarehouseConfig>) -> Self {
        Self {
            connection_manager,
            warehouse,
        }
    }

    /// Handle the query tool call.
    ///
    /// Connecting happens before the query's own error handling: a connection failure
    /// is left to the dispatcher, while any statement failure becomes `Query failed`.
    pub async fn query(&self, input: QueryInput) -> ToolResult<String> {
        let mut session = self
            .connection_manager
            .connected()
            .await
            .map_err(ToolError::Connection)?;

        let result = self
            .run(&mut session, &input)
            .await
            .map_err(ToolError::Query)?;

        info!(
            row_count = result.row_count(),
            limit = input.limit,
            "Query executed"
        );

        QueryOutput::from_result(input.query, &result)
            .render()
            .map_err(ToolError::Query)
    }

    async fn run(&self, session: &mut SessionGuard<'_>, input: &QueryInput) -> DbResult<ResultSet> {
        session
            .execute(&format!("USE CATALOG {}", self.warehouse.catalog))
            .await?;
        session
            .execute(&format!("USE SCHEMA {}", self.warehouse.schema))
            .await?;
        session
            .execute(&compose_query(&input.query, input.limit))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnMetadata;
    use serde_json::json;

    fn numbered_rows(n: usize) -> ResultSet {
        ResultSet::new(
            vec![ColumnMetadata::new("n", "INT")],
            (0..n).map(|i| vec![json!(i)]).collect(),
        )
    }

    #[test]
    fn test_query_input_deserialization() {
        let input: QueryInput =
            serde_json::from_str(r#"{"query": "SELECT * FROM games_bronze", "limit": 10}"#)
                .unwrap();
        assert_eq!(input.query, "SELECT * FROM games_bronze");
        assert_eq!(input.limit, 10);
    }

    #[test]
    fn test_query_input_defaults() {
        let input: QueryInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.query, "");
        assert_eq!(input.limit, 100);
    }

    #[test]
    fn test_query_input_rejects_non_integer_limit() {
        assert!(serde_json::from_str::<QueryInput>(r#"{"query": "x", "limit": "ten"}"#).is_err());
    }

    #[test]
    fn test_compose_query() {
        assert_eq!(
            compose_query("SELECT * FROM teams_bronze", 100),
            "SELECT * FROM teams_bronze\nLIMIT 100"
        );
        // Limits are not validated.
        assert_eq!(compose_query("SELECT 1", -5), "SELECT 1\nLIMIT -5");
    }

    #[test]
    fn test_compose_query_after_line_comment() {
        // LIMIT lands on its own line, outside the comment.
        let sql = compose_query("SELECT * FROM games_bronze -- latest season", 10);
        assert_eq!(sql.lines().last(), Some("LIMIT 10"));
    }

    #[test]
    fn test_output_truncates_display_rows() {
        let output = QueryOutput::from_result("SELECT n", &numbered_rows(120));
        assert_eq!(output.row_count, 120);
        assert_eq!(output.data.len(), 50);
        assert_eq!(output.columns, vec!["n"]);
        assert_eq!(output.data[49]["n"], json!(49));
    }

    #[test]
    fn test_output_small_result_is_complete() {
        let output = QueryOutput::from_result("SELECT n", &numbered_rows(3));
        assert_eq!(output.row_count, 3);
        assert_eq!(output.data.len(), 3);
    }

    #[test]
    fn test_render_format() {
        let result = ResultSet::new(
            vec![
                ColumnMetadata::new("school", "STRING"),
                ColumnMetadata::new("wins", "INT"),
            ],
            vec![vec![json!("Georgia"), json!(13)]],
        );
        let text = QueryOutput::from_result("SELECT school, wins", &result)
            .render()
            .unwrap();

        assert!(text.starts_with("Query Results:\n{\n  \"query\": \"SELECT school, wins\",\n"));
        let body: JsonValue = serde_json::from_str(text.trim_start_matches("Query Results:\n")).unwrap();
        assert_eq!(body["row_count"], 1);
        assert_eq!(body["columns"], json!(["school", "wins"]));
        assert_eq!(body["data"][0], json!({"school": "Georgia", "wins": 13}));
    }
}
