//! Tool catalog.
//!
//! The four tools and their input schemas are fixed. Schemas are written out by
//! hand so clients see exactly the same JSON (property order included) on every
//! release.

use serde_json::{Value as JsonValue, json};

pub const QUERY_CFDB_DATA: &str = "query_cfdb_data";
pub const GET_TABLE_SCHEMA: &str = "get_table_schema";
pub const GET_DATA_SUMMARY: &str = "get_data_summary";
pub const SUGGEST_SILVER_LAYER: &str = "suggest_silver_layer";

/// Name, description and JSON input schema of one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: JsonValue,
}

impl ToolDescriptor {
    /// The input schema as a JSON object map.
    pub fn schema_object(&self) -> serde_json::Map<String, JsonValue> {
        match &self.input_schema {
            JsonValue::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        }
    }
}

/// All tools, in the order they are advertised.
pub fn list_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: QUERY_CFDB_DATA,
            description: "Execute SQL queries against CFDB bronze layer data",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "SQL query to execute against CFDB data"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of rows to return (default 100)",
                        "default": 100
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDescriptor {
            name: GET_TABLE_SCHEMA,
            description: "Get schema information for CFDB tables",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table_name": {
                        "type": "string",
                        "description": "Name of the table to describe (teams, games, plays, etc.)"
                    }
                },
                "required": ["table_name"]
            }),
        },
        ToolDescriptor {
            name: GET_DATA_SUMMARY,
            description: "Get summary statistics and record counts for all CFDB tables",
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDescriptor {
            name: SUGGEST_SILVER_LAYER,
            description: "Analyze bronze data and suggest silver layer transformations",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "focus_area": {
                        "type": "string",
                        "description": "Specific area to focus on (games, teams, plays, stats)",
                        "enum": ["games", "teams", "plays", "stats", "all"]
                    }
                },
                "required": ["focus_area"]
            }),
        },
    ]
}
