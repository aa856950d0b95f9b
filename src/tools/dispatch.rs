//! Tool dispatch.
//!
//! Routes a tool call by name to its handler and turns the result into the text
//! block returned to the client. Every call produces text: unknown tools and
//! failures are described in the text rather than surfaced as protocol errors.

use crate::config::WarehouseConfig;
use crate::db::ConnectionManager;
use crate::error::{ToolError, ToolResult};
use crate::tools::query::{QueryInput, QueryToolHandler};
use crate::tools::registry::{
    self, GET_DATA_SUMMARY, GET_TABLE_SCHEMA, QUERY_CFDB_DATA, SUGGEST_SILVER_LAYER,
    ToolDescriptor,
};
use crate::tools::schema::{SchemaToolHandler, TableSchemaInput};
use crate::tools::silver::{SuggestSilverLayerInput, suggest_silver_layer};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Result of one tool call.
#[derive(Debug)]
pub enum ToolOutcome {
    /// The tool ran and produced its text.
    Success(String),
    /// No tool with this name exists.
    UnknownTool(String),
    /// The tool failed.
    Failed { tool: String, error: ToolError },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// The text block sent back to the client.
    pub fn into_text(self) -> String {
        match self {
            ToolOutcome::Success(text) => text,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutcome::Success(text) => f.write_str(text),
            ToolOutcome::UnknownTool(name) => write!(f, "Unknown tool: {}", name),
            ToolOutcome::Failed { error, .. } if error.is_handled() => write!(f, "{}", error),
            ToolOutcome::Failed { tool, error } => {
                write!(f, "Error executing {}: {}", tool, error)
            }
        }
    }
}

/// Routes tool calls to their handlers.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    connection_manager: Arc<ConnectionManager>,
    warehouse: Arc<WarehouseConfig>,
}

impl ToolDispatcher {
    pub fn new(connection_manager: Arc<ConnectionManager>, warehouse: WarehouseConfig) -> Self {
        Self {
            connection_manager,
            warehouse: Arc::new(warehouse),
        }
    }

    /// Tools advertised to clients.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        registry::list_tools()
    }

    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        &self.connection_manager
    }

    /// Run the named tool. Absent arguments are treated as an empty object.
    pub async fn call_tool(&self, name: &str, arguments: Option<Map<String, JsonValue>>) -> ToolOutcome {
        let arguments = arguments.unwrap_or_default();
        debug!(tool = name, "Tool called");

        let result = match name {
            QUERY_CFDB_DATA => self.query_cfdb_data(arguments).await,
            GET_TABLE_SCHEMA => self.get_table_schema(arguments).await,
            GET_DATA_SUMMARY => self.get_data_summary().await,
            SUGGEST_SILVER_LAYER => self.suggest_silver_layer(arguments),
            _ => {
                warn!(tool = name, "Unknown tool requested");
                return ToolOutcome::UnknownTool(name.to_string());
            }
        };

        match result {
            Ok(text) => ToolOutcome::Success(text),
            Err(err) => {
                let suggestion = err.suggestion().unwrap_or_default();
                if err.is_handled() {
                    warn!(tool = name, error = %err, suggestion, "Tool failed");
                } else {
                    error!(tool = name, error = %err, suggestion, "Error executing tool");
                }
                ToolOutcome::Failed {
                    tool: name.to_string(),
                    error: err,
                }
            }
        }
    }

    async fn query_cfdb_data(&self, arguments: Map<String, JsonValue>) -> ToolResult<String> {
        let input: QueryInput = parse_arguments(arguments)?;
        QueryToolHandler::new(self.connection_manager.clone(), self.warehouse.clone())
            .query(input)
            .await
    }

    async fn get_table_schema(&self, arguments: Map<String, JsonValue>) -> ToolResult<String> {
        let input: TableSchemaInput = parse_arguments(arguments)?;
        SchemaToolHandler::new(self.connection_manager.clone(), self.warehouse.clone())
            .get_table_schema(input)
            .await
    }

    async fn get_data_summary(&self) -> ToolResult<String> {
        SchemaToolHandler::new(self.connection_manager.clone(), self.warehouse.clone())
            .get_data_summary()
            .await
    }

    fn suggest_silver_layer(&self, arguments: Map<String, JsonValue>) -> ToolResult<String> {
        let input: SuggestSilverLayerInput = parse_arguments(arguments)?;
        Ok(suggest_silver_layer(&input.focus_area))
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Map<String, JsonValue>) -> Result<T, ToolError> {
    Ok(serde_json::from_value(JsonValue::Object(arguments))?)
}
