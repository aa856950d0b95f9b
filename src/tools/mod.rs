//! MCP tool implementations.
//!
//! This module contains the CFDB tool handlers:
//! - `query`: Run SQL against the bronze layer (`query_cfdb_data`)
//! - `schema`: Describe a bronze table and summarize the layer
//! - `silver`: Static silver-layer guidance
//! - `registry`: Tool names and input schemas
//! - `dispatch`: Name-based routing and outcome rendering

pub mod dispatch;
pub mod format;
pub mod query;
pub mod registry;
pub mod schema;
pub mod silver;

pub use dispatch::{ToolDispatcher, ToolOutcome};
pub use query::{QueryInput, QueryOutput, QueryToolHandler};
pub use registry::{ToolDescriptor, list_tools};
pub use schema::{SchemaToolHandler, TableSchemaInput};
pub use silver::{SuggestSilverLayerInput, suggest_silver_layer};
