//! Configuration handling for the CFDB MCP Server.
//!
//! This module provides configuration management via CLI arguments and environment variables.
//! Warehouse credentials are read as-is: missing values are kept empty and only surface
//! as connection failures once a tool first needs the warehouse.

use clap::Parser;
use std::fmt;
use std::time::Duration;

/// Catalog holding the CFDB data.
pub const CATALOG: &str = "cfdb_dev";

/// Schema holding the bronze-layer tables.
pub const SCHEMA: &str = "bronze";

pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Parser)]
#[command(
    name = "cfdb-mcp-server",
    about = "MCP server giving AI assistants access to CFDB bronze-layer data in Databricks",
    version,
    author
)]
pub struct Config {
    /// Databricks workspace hostname (e.g. adb-1234567890.12.azuredatabricks.net)
    #[arg(long, default_value = "", env = "DATABRICKS_SERVER_HOSTNAME")]
    pub server_hostname: String,

    /// HTTP path of the SQL warehouse (e.g. /sql/1.0/warehouses/abc123)
    #[arg(long, default_value = "", env = "DATABRICKS_HTTP_PATH")]
    pub http_path: String,

    /// Personal access token forwarded as a bearer token
    #[arg(long, default_value = "", env = "DATABRICKS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Statement timeout in seconds (the statement is cancelled on the warehouse afterwards)
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "MCP_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            server_hostname: String::new(),
            http_path: String::new(),
            access_token: String::new(),
            query_timeout: DEFAULT_QUERY_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Build the read-only warehouse settings shared by the connection layer.
    pub fn warehouse(&self) -> WarehouseConfig {
        WarehouseConfig {
            server_hostname: self.server_hostname.trim().to_string(),
            http_path: self.http_path.trim().to_string(),
            access_token: self.access_token.clone(),
            catalog: CATALOG.to_string(),
            schema: SCHEMA.to_string(),
            query_timeout: self.query_timeout_duration(),
            connect_timeout: self.connect_timeout_duration(),
        }
    }

    /// Get the query timeout as a Duration.
    pub fn query_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

// Hand-written so the access token never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_hostname", &self.server_hostname)
            .field("http_path", &self.http_path)
            .field("access_token", &redact(&self.access_token))
            .field("query_timeout", &self.query_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

/// Warehouse endpoint, credential and the fixed catalog/schema.
///
/// Built once at startup and never mutated.
#[derive(Clone)]
pub struct WarehouseConfig {
    pub server_hostname: String,
    pub http_path: String,
    pub access_token: String,
    pub catalog: String,
    pub schema: String,
    pub query_timeout: Duration,
    pub connect_timeout: Duration,
}

impl WarehouseConfig {
    /// Fully qualified name of a bronze table, e.g. `cfdb_dev.bronze.teams_bronze`.
    pub fn bronze_table(&self, table_name: &str) -> String {
        format!("{}.{}.{}_bronze", self.catalog, self.schema, table_name)
    }

    /// Fully qualified name of the externally maintained summary view.
    pub fn summary_view(&self) -> String {
        format!("{}.{}.bronze_summary", self.catalog, self.schema)
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Config::default_config().warehouse()
    }
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("server_hostname", &self.server_hostname)
            .field("http_path", &self.http_path)
            .field("access_token", &redact(&self.access_token))
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .field("query_timeout", &self.query_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}
