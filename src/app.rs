//! Core orchestrator for querydesk.
//!
//! Coordinates the query API client and the three stores to implement the
//! submit flow: validate, execute remotely, record history, normalize rows.

use serde_json::Value;
use tracing::{info, warn};

use crate::api::QueryApi;
use crate::db::Dialect;
use crate::error::{QueryDeskError, Result};
use crate::persistence::templates::uses_table_placeholder;
use crate::persistence::{
    ConfigStore, ConnectionConfig, DataDir, HistoryEntry, HistoryStore, Template, TemplateStore,
};
use crate::results::{normalize, ResultSet};

/// Outcome of a successful query.
///
/// "No rows" is a success, distinct from any error.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows to hand to the table and chart views.
    Rows(ResultSet),
    /// The query succeeded but returned no data.
    NoRows,
}

impl QueryOutcome {
    /// Normalizes a raw response body.
    pub fn from_body(body: Value) -> Self {
        ResultSet::from_normalized(normalize(body)).map_or(Self::NoRows, Self::Rows)
    }

    /// Rows for the viewer; `None` clears it.
    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            Self::Rows(set) => Some(set),
            Self::NoRows => None,
        }
    }

    /// Number of rows returned.
    pub fn row_count(&self) -> usize {
        self.result_set().map_or(0, ResultSet::row_count)
    }

    /// Status line shown after a query completes.
    pub fn message(&self) -> String {
        match self {
            Self::Rows(set) => format!(
                "Query executed successfully. Returned {} rows.",
                set.row_count()
            ),
            Self::NoRows => "Query executed successfully, but returned no data.".to_string(),
        }
    }
}

/// The main orchestrator that coordinates all components.
pub struct Workspace {
    /// Client for the remote query API.
    api: Box<dyn QueryApi>,
    /// Connection config record.
    config: ConfigStore,
    /// Template catalog.
    templates: TemplateStore,
    /// Query history log.
    history: HistoryStore,
}

impl Workspace {
    /// Opens the stores under `data_dir` and pairs them with `api`.
    pub fn open(api: Box<dyn QueryApi>, data_dir: &DataDir) -> Self {
        let (config, templates, history) = data_dir.open_stores();
        Self::with_stores(api, config, templates, history)
    }

    /// Creates a workspace from already-opened stores.
    pub fn with_stores(
        api: Box<dyn QueryApi>,
        config: ConfigStore,
        templates: TemplateStore,
        history: HistoryStore,
    ) -> Self {
        Self {
            api,
            config,
            templates,
            history,
        }
    }

    /// Current connection config.
    pub fn connection(&self) -> &ConnectionConfig {
        self.config.current()
    }

    /// Config store, for setters and hints.
    pub fn config_store(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    /// Template catalog.
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Template catalog, for edits.
    pub fn templates_mut(&mut self) -> &mut TemplateStore {
        &mut self.templates
    }

    /// Query history.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Query history, for favorites and deletes.
    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Checks a query before it is sent or saved.
    fn validate(&self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            warn!("Query submission attempted with empty query");
            return Err(QueryDeskError::query("Please enter a query to execute."));
        }
        if uses_table_placeholder(query) && self.connection().table_name.trim().is_empty() {
            warn!("Query with {{table_name}} placeholder attempted without table name set");
            return Err(QueryDeskError::query(
                "Table name is required when using {table_name} placeholders.",
            ));
        }
        Ok(())
    }

    /// Executes a query with the current config.
    ///
    /// History is recorded only after the API call succeeds.
    pub async fn submit(&mut self, query: &str, read_only: bool) -> Result<QueryOutcome> {
        self.validate(query)?;

        let dialect = self.connection().dialect;
        info!("Executing query for database type: {dialect}");
        info!("Read-only mode: {read_only}");

        let body = self.api.execute(query, self.config.current(), read_only).await?;

        let outcome = QueryOutcome::from_body(body);
        match &outcome {
            QueryOutcome::Rows(set) => info!("Query returned {} rows", set.row_count()),
            QueryOutcome::NoRows => info!("Query executed successfully but returned no data"),
        }

        self.history.add_query(query, dialect);
        Ok(outcome)
    }

    /// Records a query in history without executing it.
    pub fn save_query(&mut self, query: &str) -> Result<HistoryEntry> {
        if query.trim().is_empty() {
            return Err(QueryDeskError::query("Please enter a query to save."));
        }
        let dialect = self.connection().dialect;
        Ok(self.history.add_query(query, dialect))
    }

    /// Runs the fixed diagnostic query and returns the raw body.
    pub async fn run_diagnostic(&self) -> Result<Value> {
        info!("Running test query to troubleshoot API responses");
        self.api.run_diagnostic().await
    }

    /// Runs the dialect's canned test query against the current config.
    ///
    /// Read-only, and not recorded in history.
    pub async fn test_connection(&self) -> Result<QueryOutcome> {
        let query = self.config.test_query();
        info!("Testing connection for {}", self.connection().dialect);
        let body = self.api.execute(query, self.config.current(), true).await?;
        Ok(QueryOutcome::from_body(body))
    }

    /// Loads a template into the editor: switches to its dialect and
    /// returns its query text. The url and table name are kept.
    pub fn apply_template(&mut self, id: &str) -> Result<String> {
        let template = self
            .templates
            .get(id)
            .cloned()
            .ok_or_else(|| QueryDeskError::template(format!("Template '{id}' not found")))?;

        if template.dialect != self.connection().dialect {
            self.config.set_dialect(template.dialect);
        }
        Ok(template.query)
    }

    /// Saves a template from the editor, adding or updating by id.
    pub fn save_template(&mut self, template: Template) -> Result<()> {
        template.validate()?;
        self.templates.upsert(template)
    }

    /// Starts a new template for the current dialect.
    pub fn new_template(&self) -> Template {
        Template::new_for(self.connection().dialect)
    }

    /// Templates for the current dialect.
    pub fn templates_for_current_dialect(&self) -> Vec<&Template> {
        self.templates.by_dialect(self.connection().dialect)
    }

    /// Returns the query of a history entry for the editor.
    pub fn recall(&self, history_id: &str) -> Result<String> {
        self.history
            .get(history_id)
            .map(|e| e.query.clone())
            .ok_or_else(|| {
                QueryDeskError::history(format!("History entry '{history_id}' not found"))
            })
    }

    /// Changes the dialect of the connection config.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.config.set_dialect(dialect);
    }
}
