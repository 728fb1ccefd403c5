//! Query history persistence.
//!
//! Keeps an ordered, most-recent-first log of executed queries. Running the
//! same query again promotes the existing entry instead of growing the log.

use crate::db::Dialect;
use crate::persistence::{load_or_else, persist};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, Span};

/// Characters of the query shown in a one-line summary.
const SUMMARY_QUERY_CHARS: usize = 50;

/// A query history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub query: String,
    #[serde(rename = "db_type")]
    pub dialect: Dialect,
    /// ISO-8601 creation time, kept verbatim from disk.
    pub timestamp: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl HistoryEntry {
    /// Creates a new, non-favorite entry stamped with `now`.
    fn new(id: String, query: &str, dialect: Dialect, now: DateTime<Utc>) -> Self {
        Self {
            id,
            query: query.to_string(),
            dialect,
            timestamp: now.to_rfc3339(),
            is_favorite: false,
        }
    }

    /// One-line summary for list views: star, local time, truncated query.
    pub fn summary(&self) -> String {
        let star = if self.is_favorite { "★ " } else { "" };
        let time = format_timestamp(&self.timestamp);

        let mut preview: String = self.query.chars().take(SUMMARY_QUERY_CHARS).collect();
        if self.query.chars().count() > SUMMARY_QUERY_CHARS {
            preview.push_str("...");
        }

        format!("{star}{time} - {preview}")
    }
}

/// Formats an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// Zoned timestamps are shown in local time; naive ones as written.
/// Unparsable input is returned unchanged.
fn format_timestamp(timestamp: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.with_timezone(&Local).format(DISPLAY).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format(DISPLAY).to_string();
    }
    timestamp.to_string()
}

/// Owner of the persisted query history.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
    span: Span,
}

impl HistoryStore {
    /// Opens the store at `path`, loading the log.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_span(path, info_span!("history_store"))
    }

    /// Opens the store, logging within the given span.
    pub fn open_with_span(path: impl Into<PathBuf>, span: Span) -> Self {
        let mut store = Self {
            path: path.into(),
            entries: Vec::new(),
            span,
        };
        store.entries = store.load();
        store
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted log, or an empty one when absent or invalid.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let _enter = self.span.enter();
        load_or_else(&self.path, "query history", Vec::new)
    }

    /// Overwrites the persisted log.
    pub fn save(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries;
        self.flush();
    }

    fn flush(&self) {
        let _enter = self.span.enter();
        persist(&self.path, &self.entries, "query history");
    }

    /// Records a query, promoting an identical `(query, dialect)` entry to the front.
    pub fn add_query(&mut self, query: &str, dialect: Dialect) -> HistoryEntry {
        self.add_query_at(query, dialect, Utc::now())
    }

    fn add_query_at(&mut self, query: &str, dialect: Dialect, now: DateTime<Utc>) -> HistoryEntry {
        let existing = self
            .entries
            .iter()
            .position(|e| e.query == query && e.dialect == dialect);

        let entry = match existing {
            Some(pos) => {
                let entry = self.entries.remove(pos);
                self.span
                    .in_scope(|| debug!("Promoted history entry {} from position {pos}", entry.id));
                entry
            }
            None => {
                let entry = HistoryEntry::new(self.next_id(now), query, dialect, now);
                self.span
                    .in_scope(|| info!("Recorded new history entry {}", entry.id));
                entry
            }
        };

        self.entries.insert(0, entry.clone());
        self.flush();
        entry
    }

    /// Derives an id from `now`, bumped until it is unused in the log.
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis();
        loop {
            let id = format!("query_{millis}");
            if !self.entries.iter().any(|e| e.id == id) {
                return id;
            }
            millis += 1;
        }
    }

    /// Flips the favorite flag of the first matching entry.
    ///
    /// Returns the new value, or false when the id is unknown.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        entry.is_favorite = !entry.is_favorite;
        let is_favorite = entry.is_favorite;
        self.flush();
        is_favorite
    }

    /// Removes every entry with the given id.
    pub fn delete(&mut self, id: &str) {
        self.entries.retain(|e| e.id != id);
        self.flush();
    }

    /// Returns the log, or only favorites, most recent first.
    pub fn list(&self, favorites_only: bool) -> Vec<&HistoryEntry> {
        self.entries
            .iter()
            .filter(|e| !favorites_only || e.is_favorite)
            .collect()
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of entries in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
