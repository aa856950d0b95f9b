//! Connection management.
//!
//! The server talks to the warehouse through exactly one session. It is opened
//! lazily by the first tool that needs it and reused by every later call. A failed
//! open leaves the manager empty, so the next call simply tries again.

use crate::db::session::{Connector, Session};
use crate::error::{DbError, DbResult};
use crate::models::ResultSet;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

/// Exclusive access to the shared session for the duration of a tool call.
///
/// Only handed out by [`ConnectionManager::connected`] once the slot holds a session.
pub struct SessionGuard<'a> {
    slot: MutexGuard<'a, Option<Box<dyn Session>>>,
}

impl SessionGuard<'_> {
    /// Execute one statement on the locked session.
    pub async fn execute(&mut self, statement: &str) -> DbResult<ResultSet> {
        match self.slot.as_mut() {
            Some(session) => session.execute(statement).await,
            None => Err(DbError::internal("Warehouse session is not available")),
        }
    }
}

pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    session: Mutex<Option<Box<dyn Session>>>,
}

impl ConnectionManager {
    /// Create a connection manager. No connection is opened until first use.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            session: Mutex::new(None),
        }
    }

    /// Open the session if none exists yet. A no-op once connected.
    pub async fn ensure_connected(&self) -> DbResult<()> {
        self.connected().await.map(|_| ())
    }

    /// Ensure a session exists and lock it for the caller.
    ///
    /// Callers hold the guard while issuing their statements, so statements from
    /// concurrent tool calls never interleave on the session.
    pub async fn connected(&self) -> DbResult<SessionGuard<'_>> {
        let mut slot = self.session.lock().await;

        if slot.is_none() {
            debug!("Opening warehouse session");
            match self.connector.connect().await {
                Ok(session) => {
                    *slot = Some(session);
                    info!("Connected to Databricks");
                }
                Err(e) => {
                    error!(
                        error = %e,
                        suggestion = e.suggestion().unwrap_or_default(),
                        "Failed to connect to Databricks"
                    );
                    return Err(e);
                }
            }
        }

        Ok(SessionGuard { slot })
    }

    /// Whether a session is currently open.
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Drop the session, if any.
    pub async fn close(&self) {
        if self.session.lock().await.take().is_some() {
            info!("Closed warehouse session");
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connected", &self.session.try_lock().map(|s| s.is_some()).ok())
            .finish()
    }
}
