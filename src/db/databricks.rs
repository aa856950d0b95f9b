//! Databricks SQL warehouse client.
//!
//! Statements go through the SQL Statement Execution API (`/api/2.0/sql/statements`)
//! with `INLINE` disposition and `JSON_ARRAY` format. The REST API is stateless, so
//! [`DatabricksSession`] remembers the namespace selected by `USE CATALOG` /
//! `USE SCHEMA` statements and sends it along with every later statement.

use crate::config::WarehouseConfig;
use crate::db::session::{Connector, Session};
use crate::db::types::decode_row;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnMetadata, ResultSet};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Delay between status polls for statements still running after `wait_timeout`.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The API accepts a server-side wait between 5 and 50 seconds.
const MIN_WAIT_TIMEOUT_SECS: u64 = 5;
const MAX_WAIT_TIMEOUT_SECS: u64 = 50;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    warehouse_id: &'a str,
    statement: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    wait_timeout: String,
    on_wait_timeout: &'static str,
    disposition: &'static str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    statement_id: String,
    status: StatementStatus,
    #[serde(default)]
    manifest: Option<ResultManifest>,
    #[serde(default)]
    result: Option<ResultChunk>,
}

#[derive(Debug, Deserialize)]
struct StatementStatus {
    state: StatementState,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
    #[serde(other)]
    Unknown,
}

impl StatementState {
    fn is_in_progress(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ServiceError {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultManifest {
    #[serde(default)]
    schema: Option<ManifestSchema>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestSchema {
    #[serde(default)]
    columns: Vec<ManifestColumn>,
}

#[derive(Debug, Deserialize)]
struct ManifestColumn {
    name: String,
    #[serde(default)]
    type_name: Option<String>,
    #[serde(default)]
    position: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultChunk {
    #[serde(default)]
    data_array: Vec<Vec<Option<String>>>,
    #[serde(default)]
    next_chunk_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct WarehouseInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

// =============================================================================
// Connector
// =============================================================================

/// Opens sessions against the SQL warehouse named by the configured HTTP path.
#[derive(Debug, Clone)]
pub struct DatabricksConnector {
    config: WarehouseConfig,
}

impl DatabricksConnector {
    pub fn new(config: WarehouseConfig) -> Self {
        Self { config }
    }

    fn build_client(&self) -> DbResult<Client> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.config.access_token))
            .map_err(|_| {
                DbError::connection(
                    "Access token contains characters not allowed in an HTTP header",
                    "Check DATABRICKS_ACCESS_TOKEN",
                )
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        Ok(Client::builder()
            .default_headers(headers)
            .connect_timeout(self.config.connect_timeout)
            .user_agent(concat!("cfdb-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }
}

#[async_trait]
impl Connector for DatabricksConnector {
    async fn connect(&self) -> DbResult<Box<dyn Session>> {
        let base_url = workspace_url(&self.config.server_hostname)?;
        let warehouse_id = warehouse_id(&self.config.http_path)?;
        let client = self.build_client()?;

        let api = StatementApi {
            client,
            base_url,
            warehouse_id,
            query_timeout: self.config.query_timeout,
        };
        api.check_warehouse().await?;

        Ok(Box::new(DatabricksSession::new(api)))
    }
}

/// Resolve the workspace base URL. A bare hostname is served over https.
pub fn workspace_url(server_hostname: &str) -> DbResult<Url> {
    let host = server_hostname.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(DbError::connection(
            "No Databricks server hostname configured",
            "Set DATABRICKS_SERVER_HOSTNAME",
        ));
    }

    let url = if host.contains("://") {
        Url::parse(host)?
    } else {
        Url::parse(&format!("https://{}", host))?
    };
    Ok(url)
}

/// Extract the warehouse id from an HTTP path such as `/sql/1.0/warehouses/abc123`.
pub fn warehouse_id(http_path: &str) -> DbResult<String> {
    let segments: Vec<&str> = http_path.split('/').filter(|s| !s.is_empty()).collect();
    segments
        .windows(2)
        .find(|pair| pair[0] == "warehouses" || pair[0] == "endpoints")
        .map(|pair| pair[1].to_string())
        .ok_or_else(|| {
            DbError::connection(
                format!("HTTP path '{}' does not identify a SQL warehouse", http_path),
                "Set DATABRICKS_HTTP_PATH to the warehouse path, e.g. /sql/1.0/warehouses/<id>",
            )
        })
}

// =============================================================================
// Statement Execution API
// =============================================================================

#[derive(Debug)]
struct StatementApi {
    client: Client,
    base_url: Url,
    warehouse_id: String,
    query_timeout: Duration,
}

impl StatementApi {
    fn endpoint(&self, path: &str) -> DbResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Check that the warehouse exists and the token is accepted.
    async fn check_warehouse(&self) -> DbResult<()> {
        let url = self.endpoint(&format!("api/2.0/sql/warehouses/{}", self.warehouse_id))?;
        let response = self.client.get(url).send().await?;
        let response = check_status(response, true).await?;
        let info: WarehouseInfo = response.json().await?;

        info!(
            warehouse_id = %self.warehouse_id,
            warehouse = info.name.as_deref().unwrap_or(""),
            state = info.state.as_deref().unwrap_or("UNKNOWN"),
            "Warehouse reachable"
        );
        Ok(())
    }

    fn wait_timeout(&self) -> String {
        let secs = self
            .query_timeout
            .as_secs()
            .clamp(MIN_WAIT_TIMEOUT_SECS, MAX_WAIT_TIMEOUT_SECS);
        format!("{}s", secs)
    }

    async fn execute(&self, statement: &str, namespace: &Namespace) -> DbResult<ResultSet> {
        let started = Instant::now();
        let request = StatementRequest {
            warehouse_id: &self.warehouse_id,
            statement,
            catalog: namespace.catalog.as_deref(),
            schema: namespace.schema.as_deref(),
            wait_timeout: self.wait_timeout(),
            on_wait_timeout: "CONTINUE",
            disposition: "INLINE",
            format: "JSON_ARRAY",
        };

        let response = self
            .client
            .post(self.endpoint("api/2.0/sql/statements")?)
            .json(&request)
            .send()
            .await?;
        let mut response: StatementResponse = check_status(response, false).await?.json().await?;

        while response.status.state.is_in_progress() {
            if started.elapsed() >= self.query_timeout {
                self.cancel(&response.statement_id).await;
                return Err(DbError::timeout("statement", self.query_timeout.as_secs()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            response = self.status(&response.statement_id).await?;
        }

        let state = response.status.state;
        let result = match state {
            StatementState::Succeeded => self.collect(response).await,
            StatementState::Failed => Err(statement_failure(response.status.error)),
            state => Err(DbError::database(
                format!("Statement ended in state {:?}", state),
                None,
                "The statement was canceled or closed on the warehouse; run it again",
            )),
        }?;

        debug!(
            rows = result.row_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Statement finished"
        );
        Ok(result)
    }

    async fn status(&self, statement_id: &str) -> DbResult<StatementResponse> {
        let url = self.endpoint(&format!("api/2.0/sql/statements/{}", statement_id))?;
        let response = self.client.get(url).send().await?;
        Ok(check_status(response, false).await?.json().await?)
    }

    async fn chunk(&self, statement_id: &str, index: usize) -> DbResult<ResultChunk> {
        let url = self.endpoint(&format!(
            "api/2.0/sql/statements/{}/result/chunks/{}",
            statement_id, index
        ))?;
        let response = self.client.get(url).send().await?;
        Ok(check_status(response, false).await?.json().await?)
    }

    async fn cancel(&self, statement_id: &str) {
        let url = match self.endpoint(&format!("api/2.0/sql/statements/{}/cancel", statement_id)) {
            Ok(url) => url,
            Err(_) => return,
        };
        match self.client.post(url).send().await {
            Ok(_) => info!(statement_id, "Cancelled statement after timeout"),
            Err(e) => warn!(statement_id, error = %e, "Failed to cancel statement"),
        }
    }

    /// Gather the columns and every result chunk of a finished statement.
    async fn collect(&self, response: StatementResponse) -> DbResult<ResultSet> {
        let mut manifest_columns = response
            .manifest
            .and_then(|m| m.schema)
            .map(|s| s.columns)
            .unwrap_or_default();
        manifest_columns.sort_by_key(|c| c.position.unwrap_or(usize::MAX));

        let columns: Vec<ColumnMetadata> = manifest_columns
            .into_iter()
            .map(|c| ColumnMetadata::new(c.name, c.type_name.unwrap_or_else(|| "STRING".to_string())))
            .collect();

        let mut rows = Vec::new();
        let mut chunk = response.result.unwrap_or_default();
        loop {
            rows.extend(
                chunk
                    .data_array
                    .into_iter()
                    .map(|raw| decode_row(&columns, raw)),
            );
            match chunk.next_chunk_index {
                Some(index) => chunk = self.chunk(&response.statement_id, index).await?,
                None => break,
            }
        }

        Ok(ResultSet::new(columns, rows))
    }
}

/// Turn a non-2xx response into an error.
///
/// `connecting` marks the warehouse check on connect, where any failure is a connectivity problem.
async fn check_status(response: Response, connecting: bool) -> DbResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let api_error: ServiceError = serde_json::from_str(&body).unwrap_or_default();
    let message = api_error
        .message
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DbError::connection(
            format!("Authentication failed: {}", message),
            "Check DATABRICKS_ACCESS_TOKEN",
        )),
        s if connecting || s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            Err(DbError::connection(
                format!("Warehouse unavailable ({}): {}", status, message),
                "Check DATABRICKS_SERVER_HOSTNAME, DATABRICKS_HTTP_PATH and warehouse status",
            ))
        }
        _ => Err(DbError::database(
            message,
            api_error.error_code,
            "Check the SQL syntax and referenced objects",
        )),
    }
}

fn statement_failure(error: Option<ServiceError>) -> DbError {
    let error = error.unwrap_or_default();
    DbError::database(
        error
            .message
            .unwrap_or_else(|| "Statement failed".to_string()),
        error.error_code,
        "Check the SQL syntax and referenced objects",
    )
}

// =============================================================================
// Session
// =============================================================================

/// Catalog and schema applied to every statement of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

impl Namespace {
    /// Apply a `USE` statement. Returns false for any other statement.
    ///
    /// Recognizes `USE CATALOG c`, `USE SCHEMA s`, `USE DATABASE s`, `USE s` and `USE c.s`.
    pub fn apply(&mut self, statement: &str) -> bool {
        let trimmed = statement.trim().trim_end_matches(';');
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();

        match tokens.as_slice() {
            [keyword, kind, name] if keyword.eq_ignore_ascii_case("USE") => {
                if kind.eq_ignore_ascii_case("CATALOG") {
                    self.catalog = Some(unquote(name));
                    self.schema = None;
                    true
                } else if kind.eq_ignore_ascii_case("SCHEMA") || kind.eq_ignore_ascii_case("DATABASE") {
                    self.set_schema(name);
                    true
                } else {
                    false
                }
            }
            [keyword, name] if keyword.eq_ignore_ascii_case("USE") => {
                self.set_schema(name);
                true
            }
            _ => false,
        }
    }

    fn set_schema(&mut self, name: &str) {
        match name.split_once('.') {
            Some((catalog, schema)) => {
                self.catalog = Some(unquote(catalog));
                self.schema = Some(unquote(schema));
            }
            None => self.schema = Some(unquote(name)),
        }
    }
}

fn unquote(identifier: &str) -> String {
    identifier.trim_matches('`').to_string()
}

/// A logical session on a SQL warehouse.
#[derive(Debug)]
pub struct DatabricksSession {
    api: StatementApi,
    namespace: Namespace,
}

impl DatabricksSession {
    fn new(api: StatementApi) -> Self {
        Self {
            api,
            namespace: Namespace::default(),
        }
    }
}

#[async_trait]
impl Session for DatabricksSession {
    async fn execute(&mut self, statement: &str) -> DbResult<ResultSet> {
        debug!(
            warehouse_id = %self.api.warehouse_id,
            catalog = self.namespace.catalog.as_deref().unwrap_or(""),
            schema = self.namespace.schema.as_deref().unwrap_or(""),
            "Executing statement"
        );

        let result = self.api.execute(statement, &self.namespace).await?;

        // Only a statement the warehouse accepted changes the namespace.
        let mut namespace = self.namespace.clone();
        if namespace.apply(statement) {
            debug!(?namespace, "Session namespace changed");
            self.namespace = namespace;
        }
        Ok(result)
    }
}
