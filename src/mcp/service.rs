//! MCP service implementation using rmcp.
//!
//! `CfdbService` advertises the fixed tool catalog and forwards calls to the
//! dispatcher. Every call answers with a single text block, failures included.

use crate::db::ConnectionManager;
use crate::tools::{ToolDescriptor, ToolDispatcher};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use std::sync::Arc;
use tracing::debug;

pub const SERVER_NAME: &str = "cfdb-data-server";

#[derive(Clone)]
pub struct CfdbService {
    dispatcher: Arc<ToolDispatcher>,
}

impl CfdbService {
    /// Create a new service around a tool dispatcher.
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        self.dispatcher.connection_manager()
    }

    /// The advertised tools as rmcp models.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher.list_tools().iter().map(to_tool).collect()
    }
}

fn to_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool::new(
        descriptor.name,
        descriptor.description,
        Arc::new(descriptor.schema_object()),
    )
}

impl ServerHandler for CfdbService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                title: Some("CFDB Data Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for exploring the CFDB bronze layer on Databricks.\n\
                \n\
                ## Tools\n\
                - `get_data_summary`: record counts, file counts and latest ingestion per table\n\
                - `get_table_schema`: columns of `<table_name>_bronze`\n\
                - `query_cfdb_data`: run SQL in `cfdb_dev.bronze`; `LIMIT` is appended for you, \
                so do not end the query with a semicolon or a LIMIT of your own\n\
                - `suggest_silver_layer`: silver-layer design guidance (games, teams, plays, all)"
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self.tools();
        debug!(count = tools.len(), "Listing tools");
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .dispatcher
            .call_tool(&request.name, request.arguments)
            .await;
        Ok(CallToolResult::success(vec![Content::text(
            outcome.into_text(),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarehouseConfig;
    use crate::db::{Connector, Session};
    use crate::error::{DbError, DbResult};
    use async_trait::async_trait;

    struct OfflineConnector;

    #[async_trait]
    impl Connector for OfflineConnector {
        async fn connect(&self) -> DbResult<Box<dyn Session>> {
            Err(DbError::connection("offline", ""))
        }
    }

    fn create_test_service() -> CfdbService {
        let manager = Arc::new(ConnectionManager::new(Arc::new(OfflineConnector)));
        let dispatcher = ToolDispatcher::new(manager, WarehouseConfig::default());
        CfdbService::new(Arc::new(dispatcher))
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "cfdb-data-server");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_tools_match_catalog() {
        let service = create_test_service();
        let tools = service.tools();
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0].name, "query_cfdb_data");
        assert_eq!(
            tools[0].description.as_deref(),
            Some("Execute SQL queries against CFDB bronze layer data")
        );
        assert_eq!(tools[0].input_schema["required"][0], "query");
        assert_eq!(tools[3].name, "suggest_silver_layer");
    }
}
