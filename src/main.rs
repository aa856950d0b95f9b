//! CFDB MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to query CFDB bronze-layer data in a Databricks SQL warehouse.

use cfdb_mcp_server::config::Config;
use cfdb_mcp_server::db::{ConnectionManager, DatabricksConnector};
use cfdb_mcp_server::mcp::CfdbService;
use cfdb_mcp_server::tools::ToolDispatcher;
use cfdb_mcp_server::transport::{StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Everything goes to stderr: stdout belongs to the MCP protocol.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse_args();

    init_tracing(&config);

    info!(
        config = ?config,
        "Starting CFDB MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let warehouse = config.warehouse();
    if warehouse.server_hostname.is_empty()
        || warehouse.http_path.is_empty()
        || warehouse.access_token.is_empty()
    {
        // Not fatal: tools report the connection failure when first called.
        warn!(
            "Databricks credentials are incomplete; set DATABRICKS_SERVER_HOSTNAME, \
             DATABRICKS_HTTP_PATH and DATABRICKS_ACCESS_TOKEN"
        );
    }

    // The warehouse session is opened lazily on the first data tool call
    let connector = Arc::new(DatabricksConnector::new(warehouse.clone()));
    let connection_manager = Arc::new(ConnectionManager::new(connector));
    let dispatcher = Arc::new(ToolDispatcher::new(connection_manager, warehouse));
    let service = CfdbService::new(dispatcher);

    let transport = StdioTransport::new(service);
    info!(transport = transport.name(), "Using stdio transport");

    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
