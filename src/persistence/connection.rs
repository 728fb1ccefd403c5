//! Connection config persistence.
//!
//! Holds the single database-connection record the query API receives as
//! `dbConfig`. The record is only ever loaded and saved whole.

use crate::db::Dialect;
use crate::persistence::{load_or_else, persist};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, Span};
use url::Url;

/// Database connection configuration.
///
/// Field names on disk and on the wire are `type`, `url` and `tableName`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Query dialect of the target database.
    #[serde(rename = "type")]
    pub dialect: Dialect,

    /// Connection string forwarded to the query API.
    #[serde(rename = "url", default)]
    pub connection_url: String,

    /// Table substituted for `{table_name}` placeholders.
    #[serde(rename = "tableName", default)]
    pub table_name: String,
}

impl ConnectionConfig {
    /// Creates a config for the given dialect with blank url and table.
    pub fn blank(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    /// Returns a display-safe string (password masked) for UI purposes.
    pub fn display_string(&self) -> String {
        let target = if self.connection_url.trim().is_empty() {
            "(no connection string)".to_string()
        } else {
            match Url::parse(&self.connection_url) {
                Ok(mut url) => {
                    if url.password().is_some() {
                        // set_password only fails for cannot-be-a-base URLs, which carry no password
                        let _ = url.set_password(Some("****"));
                    }
                    url.to_string()
                }
                Err(_) => "(unparsable connection string)".to_string(),
            }
        };

        if self.table_name.is_empty() {
            format!("{} {}", self.dialect.display_name(), target)
        } else {
            format!(
                "{} {} [table: {}]",
                self.dialect.display_name(),
                target,
                self.table_name
            )
        }
    }
}

/// Returns an example connection string for the dialect, used as input hint.
pub fn connection_placeholder_for(dialect: Dialect) -> String {
    format!(
        "{}://username:password@hostname:{}/database",
        dialect.url_scheme(),
        dialect.default_port()
    )
}

/// Returns a canned diagnostic query for the dialect.
pub fn test_query_for(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Postgres => {
            "SELECT current_database() as database, current_user as user, version() as version;"
        }
        Dialect::Mysql => "SELECT database() as database, user() as user, version() as version;",
        Dialect::Mongodb => "{ find: 'system.version', limit: 1 }",
    }
}

/// Owner of the persisted connection config record.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: ConnectionConfig,
    span: Span,
}

impl ConfigStore {
    /// Opens the store at `path`, loading the persisted record.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_span(path, info_span!("config_store"))
    }

    /// Opens the store, logging within the given span.
    pub fn open_with_span(path: impl Into<PathBuf>, span: Span) -> Self {
        let mut store = Self {
            path: path.into(),
            config: ConnectionConfig::default(),
            span,
        };
        store.config = store.load();
        store
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted record, or the default when absent or invalid.
    ///
    /// An unknown dialect makes the whole record invalid.
    pub fn load(&self) -> ConnectionConfig {
        let _enter = self.span.enter();
        load_or_else(&self.path, "database configuration", ConnectionConfig::default)
    }

    /// Overwrites the persisted record.
    pub fn save(&mut self, config: ConnectionConfig) {
        let _enter = self.span.enter();
        self.config = config;
        persist(&self.path, &self.config, "database configuration");
    }

    /// Returns the current record.
    pub fn current(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Changes the dialect and rewrites the record.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        let mut config = self.config.clone();
        config.dialect = dialect;
        self.save(config);
        let _enter = self.span.enter();
        info!("Database type changed to: {dialect}");
    }

    /// Changes the table name and rewrites the record.
    pub fn set_table_name(&mut self, table_name: impl Into<String>) {
        let mut config = self.config.clone();
        config.table_name = table_name.into();
        self.save(config);
        let _enter = self.span.enter();
        info!("Table name changed to: {}", self.config.table_name);
    }

    /// Changes the connection string and rewrites the record.
    pub fn set_connection_url(&mut self, connection_url: impl Into<String>) {
        let mut config = self.config.clone();
        config.connection_url = connection_url.into();
        self.save(config);
        let _enter = self.span.enter();
        info!("Connection string updated");
    }

    /// Example connection string for the current dialect.
    pub fn connection_placeholder(&self) -> String {
        connection_placeholder_for(self.config.dialect)
    }

    /// Diagnostic query for the current dialect.
    pub fn test_query(&self) -> &'static str {
        test_query_for(self.config.dialect)
    }
}
