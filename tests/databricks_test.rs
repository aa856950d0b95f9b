//! Integration tests for the Databricks statement client against a mock workspace.

use cfdb_mcp_server::config::WarehouseConfig;
use cfdb_mcp_server::db::{Connector, DatabricksConnector};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use std::time::Duration;

const WAREHOUSE_PATH: &str = "/api/2.0/sql/warehouses/wh-test";
const STATEMENTS_PATH: &str = "/api/2.0/sql/statements";

fn warehouse_config(server: &ServerGuard) -> WarehouseConfig {
    WarehouseConfig {
        server_hostname: server.url(),
        http_path: "/sql/1.0/warehouses/wh-test".to_string(),
        access_token: "dapi-test-token".to_string(),
        query_timeout: Duration::from_secs(10),
        connect_timeout: Duration::from_secs(5),
        ..WarehouseConfig::default()
    }
}

async fn mock_warehouse(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", WAREHOUSE_PATH)
        .match_header("authorization", "Bearer dapi-test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "wh-test", "name": "Starter Warehouse", "state": "RUNNING"}).to_string())
        .create_async()
        .await
}

async fn mock_statement(server: &mut ServerGuard, request: serde_json::Value, response: serde_json::Value) -> Mock {
    server
        .mock("POST", STATEMENTS_PATH)
        .match_body(Matcher::PartialJson(request))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(response.to_string())
        .create_async()
        .await
}

fn succeeded_without_rows(statement_id: &str) -> serde_json::Value {
    json!({
        "statement_id": statement_id,
        "status": {"state": "SUCCEEDED"},
        "manifest": {"schema": {"column_count": 0, "columns": []}},
        "result": {"chunk_index": 0, "row_offset": 0, "row_count": 0}
    })
}

#[tokio::test]
async fn test_connect_checks_warehouse() {
    let mut server = Server::new_async().await;
    let warehouse = mock_warehouse(&mut server).await;

    let connector = DatabricksConnector::new(warehouse_config(&server));
    assert!(connector.connect().await.is_ok());
    warehouse.assert_async().await;
}

#[tokio::test]
async fn test_connect_rejected_token() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", WAREHOUSE_PATH)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(json!({"error_code": "UNAUTHENTICATED", "message": "Invalid access token."}).to_string())
        .create_async()
        .await;

    let connector = DatabricksConnector::new(warehouse_config(&server));
    let err = connector.connect().await.err().expect("connect should fail");
    assert!(err.is_connectivity());
    assert!(err.to_string().contains("Invalid access token."));
}

#[tokio::test]
async fn test_connect_unknown_warehouse() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", WAREHOUSE_PATH)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(json!({"error_code": "RESOURCE_DOES_NOT_EXIST", "message": "No warehouse"}).to_string())
        .create_async()
        .await;

    let connector = DatabricksConnector::new(warehouse_config(&server));
    let err = connector.connect().await.err().expect("connect should fail");
    assert!(err.is_connectivity());
}

#[tokio::test]
async fn test_connect_requires_hostname() {
    let connector = DatabricksConnector::new(WarehouseConfig::default());
    let err = connector.connect().await.err().expect("connect should fail");
    assert!(err.is_connectivity());
    assert!(err.to_string().contains("hostname"));
}

#[tokio::test]
async fn test_statement_rows_across_chunks() {
    let mut server = Server::new_async().await;
    mock_warehouse(&mut server).await;
    let submit = mock_statement(
        &mut server,
        json!({
            "warehouse_id": "wh-test",
            "statement": "SELECT id, school, rating FROM teams_bronze",
            "disposition": "INLINE",
            "format": "JSON_ARRAY"
        }),
        json!({
            "statement_id": "st-1",
            "status": {"state": "SUCCEEDED"},
            "manifest": {"schema": {"column_count": 3, "columns": [
                {"name": "school", "type_name": "STRING", "position": 1},
                {"name": "id", "type_name": "INT", "position": 0},
                {"name": "rating", "type_name": "DOUBLE", "position": 2}
            ]}},
            "result": {
                "chunk_index": 0,
                "data_array": [["1", "Alabama", "27.5"]],
                "next_chunk_index": 1
            }
        }),
    )
    .await;
    let chunk = server
        .mock("GET", "/api/2.0/sql/statements/st-1/result/chunks/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"chunk_index": 1, "data_array": [["2", null, null]]}).to_string())
        .create_async()
        .await;

    let connector = DatabricksConnector::new(warehouse_config(&server));
    let mut session = connector.connect().await.unwrap();
    let result = session
        .execute("SELECT id, school, rating FROM teams_bronze")
        .await
        .unwrap();

    assert_eq!(result.column_names(), vec!["id", "school", "rating"]);
    assert_eq!(result.row_count(), 2);
    assert_eq!(result.rows[0], vec![json!(1), json!("Alabama"), json!(27.5)]);
    assert_eq!(result.rows[1], vec![json!(2), json!(null), json!(null)]);
    submit.assert_async().await;
    chunk.assert_async().await;
}

#[tokio::test]
async fn test_statement_polls_until_finished() {
    let mut server = Server::new_async().await;
    mock_warehouse(&mut server).await;
    mock_statement(
        &mut server,
        json!({"statement": "SELECT COUNT(*) AS n FROM plays_bronze"}),
        json!({"statement_id": "st-2", "status": {"state": "PENDING"}}),
    )
    .await;
    let poll = server
        .mock("GET", "/api/2.0/sql/statements/st-2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "statement_id": "st-2",
                "status": {"state": "SUCCEEDED"},
                "manifest": {"schema": {"columns": [{"name": "n", "type_name": "LONG", "position": 0}]}},
                "result": {"data_array": [["1234567"]]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let connector = DatabricksConnector::new(warehouse_config(&server));
    let mut session = connector.connect().await.unwrap();
    let result = session
        .execute("SELECT COUNT(*) AS n FROM plays_bronze")
        .await
        .unwrap();

    assert_eq!(result.rows, vec![vec![json!(1234567)]]);
    poll.assert_async().await;
}

#[tokio::test]
async fn test_failed_statement_reports_engine_message() {
    let mut server = Server::new_async().await;
    mock_warehouse(&mut server).await;
    mock_statement(
        &mut server,
        json!({"statement": "SELECT * FROM nope"}),
        json!({
            "statement_id": "st-3",
            "status": {
                "state": "FAILED",
                "error": {
                    "error_code": "TABLE_OR_VIEW_NOT_FOUND",
                    "message": "[TABLE_OR_VIEW_NOT_FOUND] The table or view `nope` cannot be found."
                }
            }
        }),
    )
    .await;

    let connector = DatabricksConnector::new(warehouse_config(&server));
    let mut session = connector.connect().await.unwrap();
    let err = session.execute("SELECT * FROM nope").await.unwrap_err();

    assert!(!err.is_connectivity());
    assert_eq!(
        err.to_string(),
        "[TABLE_OR_VIEW_NOT_FOUND] The table or view `nope` cannot be found. (error code: TABLE_OR_VIEW_NOT_FOUND)"
    );
}

#[tokio::test]
async fn test_rejected_statement_is_database_error() {
    let mut server = Server::new_async().await;
    mock_warehouse(&mut server).await;
    server
        .mock("POST", STATEMENTS_PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({"error_code": "INVALID_PARAMETER_VALUE", "message": "Syntax error at LIMIT"}).to_string())
        .create_async()
        .await;

    let connector = DatabricksConnector::new(warehouse_config(&server));
    let mut session = connector.connect().await.unwrap();
    let err = session.execute("SELECT 1;\nLIMIT 100").await.unwrap_err();

    assert!(!err.is_connectivity());
    assert!(err.to_string().starts_with("Syntax error at LIMIT"));
}

#[tokio::test]
async fn test_use_statements_carry_namespace_forward() {
    let mut server = Server::new_async().await;
    mock_warehouse(&mut server).await;
    let use_catalog = mock_statement(
        &mut server,
        json!({"statement": "USE CATALOG cfdb_dev"}),
        succeeded_without_rows("st-use-1"),
    )
    .await;
    let use_schema = mock_statement(
        &mut server,
        json!({"statement": "USE SCHEMA bronze", "catalog": "cfdb_dev"}),
        succeeded_without_rows("st-use-2"),
    )
    .await;
    let query = mock_statement(
        &mut server,
        json!({
            "statement": "SELECT * FROM games_bronze\nLIMIT 5",
            "catalog": "cfdb_dev",
            "schema": "bronze"
        }),
        succeeded_without_rows("st-q"),
    )
    .await;

    let connector = DatabricksConnector::new(warehouse_config(&server));
    let mut session = connector.connect().await.unwrap();
    session.execute("USE CATALOG cfdb_dev").await.unwrap();
    session.execute("USE SCHEMA bronze").await.unwrap();
    let result = session
        .execute("SELECT * FROM games_bronze\nLIMIT 5")
        .await
        .unwrap();

    assert!(result.is_empty());
    use_catalog.assert_async().await;
    use_schema.assert_async().await;
    query.assert_async().await;
}

#[tokio::test]
async fn test_statement_timeout_cancels_on_warehouse() {
    let mut server = Server::new_async().await;
    mock_warehouse(&mut server).await;
    mock_statement(
        &mut server,
        json!({"statement": "SELECT * FROM plays_bronze"}),
        json!({"statement_id": "st-slow", "status": {"state": "RUNNING"}}),
    )
    .await;
    let poll = server
        .mock("GET", "/api/2.0/sql/statements/st-slow")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"statement_id": "st-slow", "status": {"state": "RUNNING"}}).to_string())
        .expect_at_least(1)
        .create_async()
        .await;
    let cancel = server
        .mock("POST", "/api/2.0/sql/statements/st-slow/cancel")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let config = WarehouseConfig {
        query_timeout: Duration::from_secs(1),
        ..warehouse_config(&server)
    };
    let connector = DatabricksConnector::new(config);
    let mut session = connector.connect().await.unwrap();
    let err = session
        .execute("SELECT * FROM plays_bronze")
        .await
        .unwrap_err();

    assert!(err.is_connectivity());
    assert_eq!(err.to_string(), "Timeout: statement exceeded 1s");
    poll.assert_async().await;
    cancel.assert_async().await;
}
