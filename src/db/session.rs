//! SQL engine boundary.
//!
//! A `Connector` opens sessions; a `Session` runs statements one at a time and
//! returns every row they produced. The Databricks implementation lives in
//! [`crate::db::databricks`]; tests plug in their own.

use crate::error::DbResult;
use crate::models::ResultSet;
use async_trait::async_trait;

/// Opens sessions against a SQL engine.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a new session. Fails with a connection error if the engine is unreachable
    /// or refuses the credentials.
    async fn connect(&self) -> DbResult<Box<dyn Session>>;
}

/// A live session: statements run in order and share session state
/// (current catalog and schema).
#[async_trait]
pub trait Session: Send {
    /// Execute one statement and fetch all of its rows.
    async fn execute(&mut self, statement: &str) -> DbResult<ResultSet>;
}
