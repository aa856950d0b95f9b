//! Error types for the CFDB MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! `DbError` covers everything that can go wrong talking to the warehouse; `ToolError`
//! describes how a tool invocation failed and renders the text the caller sees.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("{}", format_database_message(.message, .error_code))]
    Database {
        message: String,
        /// Databricks error code, e.g. "TABLE_OR_VIEW_NOT_FOUND"
        error_code: Option<String>,
        suggestion: String,
    },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn format_database_message(message: &str, error_code: &Option<String>) -> String {
    match error_code {
        Some(code) => format!("{} (error code: {})", message, code),
        None => message.to_string(),
    }
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with an optional Databricks error code.
    pub fn database(
        message: impl Into<String>,
        error_code: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            error_code,
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } | Self::Database { suggestion, .. } => {
                Some(suggestion.as_str()).filter(|s| !s.is_empty())
            }
            _ => None,
        }
    }

    /// Whether this error means the warehouse could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// Convert reqwest errors to DbError.
impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() && err.is_timeout() {
            DbError::connection(
                format!("Timed out connecting to the warehouse: {}", err),
                "Check DATABRICKS_SERVER_HOSTNAME or raise MCP_CONNECT_TIMEOUT",
            )
        } else if err.is_timeout() {
            DbError::connection(
                format!("Warehouse request timed out: {}", err),
                "Check network connectivity and warehouse status",
            )
        } else if err.is_connect() {
            DbError::connection(
                format!("Could not reach the warehouse: {}", err),
                "Check DATABRICKS_SERVER_HOSTNAME and network connectivity",
            )
        } else if err.is_decode() {
            DbError::internal(format!("Unexpected response from the warehouse: {}", err))
        } else if err.is_builder() {
            DbError::connection(
                format!("Invalid request: {}", err),
                "Check DATABRICKS_SERVER_HOSTNAME and DATABRICKS_ACCESS_TOKEN",
            )
        } else {
            DbError::connection(
                format!("HTTP error: {}", err),
                "Check network connectivity and warehouse status",
            )
        }
    }
}

impl From<url::ParseError> for DbError {
    fn from(err: url::ParseError) -> Self {
        DbError::connection(
            format!("Invalid warehouse URL: {}", err),
            "Check DATABRICKS_SERVER_HOSTNAME",
        )
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Failure of a single tool invocation.
///
/// The first three variants are failures a handler reports itself; the rest are
/// caught by the dispatcher and reported generically.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Query failed: {0}")]
    Query(#[source] DbError),

    #[error("Failed to get schema for {table_name}: {source}")]
    Schema {
        table_name: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to get data summary: {0}")]
    Summary(#[source] DbError),

    #[error("{0}")]
    Connection(#[source] DbError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    /// Suggestion carried by the underlying warehouse error, if any.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Query(source)
            | Self::Schema { source, .. }
            | Self::Summary(source)
            | Self::Connection(source) => source.suggestion(),
            Self::InvalidArguments(_) => None,
        }
    }

    /// True when the handler reported the failure with its own message.
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            Self::Query(_) | Self::Schema { .. } | Self::Summary(_)
        )
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
