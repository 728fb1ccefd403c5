//! Persistence layer for querydesk.
//!
//! Manages the local JSON files for the connection config, the template
//! catalog, and the query history. Each store is the sole writer of its file.
//! Reads never fail the caller: a missing or unparsable file yields the
//! store's default. Writes are best-effort and only logged on failure.

pub mod connection;
pub mod history;
pub mod templates;

pub use connection::{ConfigStore, ConnectionConfig};
pub use history::{HistoryEntry, HistoryStore};
pub use templates::{Template, TemplateStore};

use crate::error::{QueryDeskError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// File name of the connection config record.
pub const CONFIG_FILE: &str = "db_config.json";
/// File name of the template catalog.
pub const TEMPLATES_FILE: &str = "templates.json";
/// File name of the query history log.
pub const HISTORY_FILE: &str = "query_history.json";

/// Outcome of reading a store file.
#[derive(Debug)]
pub(crate) enum Loaded<T> {
    /// File parsed successfully.
    Found(T),
    /// File does not exist.
    Missing,
    /// File exists but could not be read or parsed.
    Invalid(QueryDeskError),
}

/// Reads and parses a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Loaded<T> {
    if !path.exists() {
        return Loaded::Missing;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            return Loaded::Invalid(QueryDeskError::internal(format!(
                "Failed to read {}: {e}",
                path.display()
            )))
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Loaded::Found(value),
        Err(e) => Loaded::Invalid(QueryDeskError::internal(format!(
            "Failed to parse {}: {e}",
            path.display()
        ))),
    }
}

/// Serializes `value` and overwrites the file at `path`.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            QueryDeskError::internal(format!(
                "Failed to create data directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let content = serde_json::to_string_pretty(value)
        .map_err(|e| QueryDeskError::internal(format!("Failed to serialize: {e}")))?;

    std::fs::write(path, content).map_err(|e| {
        QueryDeskError::internal(format!("Failed to write {}: {e}", path.display()))
    })
}

/// Best-effort write: failures are logged and swallowed.
pub(crate) fn persist<T: Serialize + ?Sized>(path: &Path, value: &T, what: &str) {
    match write_json(path, value) {
        Ok(()) => debug!("Saved {what} to {}", path.display()),
        Err(e) => error!("Error saving {what}: {e}"),
    }
}

/// Reads a store file, falling back to `default` when it is missing or invalid.
pub(crate) fn load_or_else<T: DeserializeOwned>(
    path: &Path,
    what: &str,
    default: impl FnOnce() -> T,
) -> T {
    match read_json(path) {
        Loaded::Found(value) => {
            info!("Loaded {what} from {}", path.display());
            value
        }
        Loaded::Missing => {
            info!("No saved {what} found at {}, using defaults", path.display());
            default()
        }
        Loaded::Invalid(e) => {
            warn!("Error loading {what}: {e}. Using defaults");
            default()
        }
    }
}

/// Location of the store files on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Uses the given directory for all store files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the default data directory for the current platform.
    ///
    /// - Linux: `~/.local/share/querydesk`
    /// - macOS: `~/Library/Application Support/querydesk`
    /// - Windows: `%APPDATA%\querydesk`
    pub fn default_dir() -> Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| QueryDeskError::config("Could not determine data directory"))?;
        Ok(Self::new(base.join("querydesk")))
    }

    /// Returns the directory holding the store files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the connection config record.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path of the template catalog.
    pub fn templates_path(&self) -> PathBuf {
        self.root.join(TEMPLATES_FILE)
    }

    /// Path of the query history log.
    pub fn history_path(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    /// Opens all three stores rooted at this directory.
    pub fn open_stores(&self) -> (ConfigStore, TemplateStore, HistoryStore) {
        (
            ConfigStore::open(self.config_path()),
            TemplateStore::open(self.templates_path()),
            HistoryStore::open(self.history_path()),
        )
    }
}
