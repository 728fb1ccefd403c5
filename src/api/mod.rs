//! Query API integration for querydesk.
//!
//! Queries are not executed locally: they are posted, together with the
//! connection config, to a remote query-execution API.

pub mod client;
pub mod mock;

pub use client::{ApiClient, ApiClientConfig};
pub use mock::MockQueryApi;

use crate::db::Dialect;
use crate::error::Result;
use crate::persistence::templates::{uses_table_placeholder, TABLE_NAME_PLACEHOLDER};
use crate::persistence::ConnectionConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Path of the execution endpoint, relative to the base URL.
pub const EXECUTE_PATH: &str = "/api/queries/execute";

/// Trivial query used to check that the API is reachable.
pub const DIAGNOSTIC_QUERY: &str = "SELECT 1 as test";

/// Body of an execution request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    pub db_config: ConnectionConfig,
    pub read_only: bool,
}

impl QueryRequest {
    /// Builds a request, rewriting the query for the config's dialect.
    pub fn new(query: &str, config: &ConnectionConfig, read_only: bool) -> Self {
        Self {
            query: prepare_query(query, config),
            db_config: config.clone(),
            read_only,
        }
    }
}

/// Rewrites `{table_name}` placeholders for dialects that need it.
///
/// Only postgres substitutes; the table name is double-quoted. Other dialects
/// get the query unchanged.
pub fn prepare_query(query: &str, config: &ConnectionConfig) -> String {
    if config.dialect.substitutes_table_name() && uses_table_placeholder(query) {
        query.replace(TABLE_NAME_PLACEHOLDER, &format!("\"{}\"", config.table_name))
    } else {
        query.to_string()
    }
}

/// Trait for clients of the query-execution API.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait QueryApi: Send + Sync {
    /// Executes a query and returns the decoded response body, unnormalized.
    async fn execute(
        &self,
        query: &str,
        config: &ConnectionConfig,
        read_only: bool,
    ) -> Result<Value>;

    /// Runs `SELECT 1 as test` against a blank postgres config, read-only.
    async fn run_diagnostic(&self) -> Result<Value> {
        self.execute(
            DIAGNOSTIC_QUERY,
            &ConnectionConfig::blank(Dialect::Postgres),
            true,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config(dialect: Dialect, table: &str) -> ConnectionConfig {
        ConnectionConfig {
            dialect,
            connection_url: String::new(),
            table_name: table.to_string(),
        }
    }

    #[test]
    fn test_postgres_substitutes_quoted_table() {
        let processed = prepare_query("SELECT * FROM {table_name}", &config(Dialect::Postgres, "users"));
        assert_eq!(processed, r#"SELECT * FROM "users""#);
    }

    #[test]
    fn test_postgres_substitutes_every_occurrence() {
        let processed = prepare_query(
            "SELECT a.* FROM {table_name} a JOIN {table_name} b ON a.id = b.parent_id",
            &config(Dialect::Postgres, "nodes"),
        );
        assert_eq!(
            processed,
            r#"SELECT a.* FROM "nodes" a JOIN "nodes" b ON a.id = b.parent_id"#
        );
    }

    #[test]
    fn test_other_dialects_pass_through() {
        let query = "SELECT * FROM {table_name}";
        assert_eq!(prepare_query(query, &config(Dialect::Mysql, "users")), query);
        assert_eq!(prepare_query(query, &config(Dialect::Mongodb, "users")), query);
    }

    #[test]
    fn test_request_body_shape() {
        let request = QueryRequest::new(
            "SELECT COUNT(*) FROM {table_name}",
            &ConnectionConfig {
                dialect: Dialect::Postgres,
                connection_url: "postgresql://localhost/app".to_string(),
                table_name: "orders".to_string(),
            },
            true,
        );

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": "SELECT COUNT(*) FROM \"orders\"",
                "dbConfig": {
                    "type": "postgres",
                    "url": "postgresql://localhost/app",
                    "tableName": "orders"
                },
                "readOnly": true
            })
        );
    }
}
