//! End-to-end tests of the submit flow against a mock API.

use querydesk::api::MockQueryApi;
use querydesk::app::{QueryOutcome, Workspace};
use querydesk::db::Dialect;
use querydesk::persistence::{DataDir, HistoryStore};
use querydesk::results::{AxisSelection, ChartKind};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

/// Shares one mock between the workspace and the test.
struct SharedMock(Arc<MockQueryApi>);

#[async_trait::async_trait]
impl querydesk::api::QueryApi for SharedMock {
    async fn execute(
        &self,
        query: &str,
        config: &querydesk::persistence::ConnectionConfig,
        read_only: bool,
    ) -> querydesk::error::Result<serde_json::Value> {
        self.0.execute(query, config, read_only).await
    }
}

#[tokio::test]
async fn test_submit_flow_end_to_end() {
    let dir = tempdir().unwrap();
    let data_dir = DataDir::new(dir.path());
    let mock = Arc::new(MockQueryApi::responding(json!({
        "data": [
            {"region": "EU", "sales": 120, "note": null},
            {"region": "US", "sales": 95.5, "note": "est."}
        ],
        "meta": {"rowCount": 2}
    })));
    let mut ws = Workspace::open(Box::new(SharedMock(mock.clone())), &data_dir);

    ws.config_store().set_table_name("sales");
    ws.config_store()
        .set_connection_url("postgresql://u:p@localhost:5432/shop");

    let outcome = ws
        .submit("SELECT * FROM {table_name}", true)
        .await
        .unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.query, "SELECT * FROM \"sales\"");
    assert!(request.read_only);
    assert_eq!(request.db_config.table_name, "sales");

    let set = outcome.result_set().unwrap();
    assert_eq!(set.columns(), ["region", "sales", "note"]);
    assert_eq!(set.cell(0, "note"), "");
    assert_eq!(set.numeric_columns(), vec!["sales"]);

    let axes = AxisSelection::choose(set, None, None).unwrap();
    assert_eq!(axes.x, "region");
    assert_eq!(axes.y, "sales");
    assert_eq!("scatter".parse::<ChartKind>().unwrap(), ChartKind::Scatter);

    // History is recorded with the raw query text and persisted.
    let history = HistoryStore::open(data_dir.history_path());
    assert_eq!(history.len(), 1);
    assert_eq!(history.list(false)[0].query, "SELECT * FROM {table_name}");
}

#[tokio::test]
async fn test_no_rows_is_success() {
    let dir = tempdir().unwrap();
    let mut ws = Workspace::open(
        Box::new(MockQueryApi::responding(json!({"data": []}))),
        &DataDir::new(dir.path()),
    );

    let outcome = ws.submit("DELETE FROM t WHERE false", false).await.unwrap();
    assert_eq!(outcome, QueryOutcome::NoRows);
    assert_eq!(
        outcome.message(),
        "Query executed successfully, but returned no data."
    );
    assert_eq!(ws.history().len(), 1);
}

#[tokio::test]
async fn test_unreachable_api_leaves_history_untouched() {
    let dir = tempdir().unwrap();
    let mut ws = Workspace::open(
        Box::new(MockQueryApi::unreachable("connection refused")),
        &DataDir::new(dir.path()),
    );

    let err = ws.submit("SELECT 1", true).await.unwrap_err();
    assert!(err.is_api());
    assert!(ws.history().is_empty());
}

#[tokio::test]
async fn test_connection_check_uses_dialect_query() {
    let dir = tempdir().unwrap();
    let mock = Arc::new(MockQueryApi::new());
    let mut ws = Workspace::open(
        Box::new(SharedMock(mock.clone())),
        &DataDir::new(dir.path()),
    );

    ws.set_dialect(Dialect::Mongodb);
    ws.test_connection().await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.db_config.dialect, Dialect::Mongodb);
    assert!(request.read_only);
    assert!(ws.history().is_empty());
}

#[tokio::test]
async fn test_templates_follow_dialect() {
    let dir = tempdir().unwrap();
    let mut ws = Workspace::open(Box::new(MockQueryApi::new()), &DataDir::new(dir.path()));

    assert_eq!(ws.templates_for_current_dialect().len(), 2);
    ws.set_dialect(Dialect::Mongodb);
    let names: Vec<_> = ws
        .templates_for_current_dialect()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["Find MongoDB Documents"]);
    ws.set_dialect(Dialect::Mysql);
    assert!(ws.templates_for_current_dialect().is_empty());
}
