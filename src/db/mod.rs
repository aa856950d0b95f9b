//! Database abstraction layer.
//!
//! This module provides warehouse access functionality:
//! - The `Connector`/`Session` seam to the SQL engine
//! - The lazily opened, shared session (`ConnectionManager`)
//! - The Databricks SQL Statement Execution API client
//! - Databricks type mappings

pub mod connection;
pub mod databricks;
pub mod session;
pub mod types;

pub use connection::{ConnectionManager, SessionGuard};
pub use databricks::{DatabricksConnector, DatabricksSession};
pub use session::{Connector, Session};
