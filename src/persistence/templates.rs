//! Query template persistence.
//!
//! CRUD operations for the catalog of reusable, parametrized queries.
//! Templates are keyed by id; catalog order is insertion order.

use crate::db::Dialect;
use crate::error::{QueryDeskError, Result};
use crate::persistence::{load_or_else, persist};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn, Span};

/// Placeholder token replaced with the configured table name.
pub const TABLE_NAME_PLACEHOLDER: &str = "{table_name}";

/// Category given to templates created by the user.
pub const CUSTOM_CATEGORY: &str = "Custom";

/// A reusable query template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub query: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "database_type")]
    pub dialect: Dialect,
    #[serde(default)]
    pub is_public: bool,
}

impl Template {
    /// Creates an empty user template for the dialect with a fresh unique id.
    pub fn new_for(dialect: Dialect) -> Self {
        Self {
            id: format!("template_{}", uuid::Uuid::new_v4().simple()),
            name: String::new(),
            description: String::new(),
            query: String::new(),
            category: CUSTOM_CATEGORY.to_string(),
            dialect,
            is_public: false,
        }
    }

    /// Checks the fields required before a template can be saved.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(QueryDeskError::template("Template name is required."));
        }
        if self.query.trim().is_empty() {
            return Err(QueryDeskError::template("Query is required."));
        }
        Ok(())
    }
}

/// Returns true if the query references the table placeholder.
pub fn uses_table_placeholder(query: &str) -> bool {
    query.contains(TABLE_NAME_PLACEHOLDER)
}

/// Returns the built-in catalog used when no templates file exists.
pub fn default_templates() -> Vec<Template> {
    fn seed(id: &str, name: &str, description: &str, query: &str, dialect: Dialect) -> Template {
        Template {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            query: query.to_string(),
            category: "Basic".to_string(),
            dialect,
            is_public: true,
        }
    }

    vec![
        seed(
            "template_1",
            "Select All Records",
            "Retrieve all records from a table",
            "SELECT * FROM {table_name}",
            Dialect::Postgres,
        ),
        seed(
            "template_2",
            "Count Records",
            "Count the number of records in a table",
            "SELECT COUNT(*) FROM {table_name}",
            Dialect::Postgres,
        ),
        seed(
            "template_3",
            "Find MongoDB Documents",
            "Find documents in a MongoDB collection",
            r#"{ "find": {} }"#,
            Dialect::Mongodb,
        ),
    ]
}

/// Owner of the persisted template catalog.
#[derive(Debug)]
pub struct TemplateStore {
    path: PathBuf,
    templates: Vec<Template>,
    span: Span,
}

impl TemplateStore {
    /// Opens the store at `path`, loading the catalog.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_span(path, info_span!("template_store"))
    }

    /// Opens the store, logging within the given span.
    pub fn open_with_span(path: impl Into<PathBuf>, span: Span) -> Self {
        let mut store = Self {
            path: path.into(),
            templates: Vec::new(),
            span,
        };
        store.templates = store.load();
        store
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted catalog, or the built-in one when absent or invalid.
    pub fn load(&self) -> Vec<Template> {
        let _enter = self.span.enter();
        load_or_else(&self.path, "templates", default_templates)
    }

    /// Overwrites the persisted catalog.
    pub fn save(&mut self, templates: Vec<Template>) {
        self.templates = templates;
        self.flush();
    }

    fn flush(&self) {
        let _enter = self.span.enter();
        persist(&self.path, &self.templates, "templates");
    }

    /// Returns the whole catalog in stored order.
    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    /// Looks up a template by id.
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Appends a template. The id must not already be in the catalog.
    pub fn add(&mut self, template: Template) -> Result<()> {
        if self.get(&template.id).is_some() {
            self.span
                .in_scope(|| warn!("Rejected template with duplicate id {}", template.id));
            return Err(QueryDeskError::template(format!(
                "Template '{}' already exists",
                template.id
            )));
        }

        self.span
            .in_scope(|| info!("Adding template {} ({})", template.id, template.name));
        self.templates.push(template);
        self.flush();
        Ok(())
    }

    /// Replaces the first template with a matching id.
    ///
    /// Returns false, without writing, when no template matches.
    pub fn update(&mut self, template: Template) -> bool {
        let Some(pos) = self.templates.iter().position(|t| t.id == template.id) else {
            return false;
        };
        self.templates[pos] = template;
        self.flush();
        true
    }

    /// Updates the template when its id exists, adds it otherwise.
    pub fn upsert(&mut self, template: Template) -> Result<()> {
        if self.update(template.clone()) {
            Ok(())
        } else {
            self.add(template)
        }
    }

    /// Removes every template with the given id. No-op when absent.
    pub fn delete(&mut self, id: &str) {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        let removed = before - self.templates.len();
        self.span
            .in_scope(|| info!("Deleted {removed} template(s) with id {id}"));
        self.flush();
    }

    /// Templates for one dialect, in catalog order.
    pub fn by_dialect(&self, dialect: Dialect) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| t.dialect == dialect)
            .collect()
    }
}
