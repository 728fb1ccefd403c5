//! Transport-agnostic command output and its plain-text rendering.
//!
//! Command handlers return these values; the CLI renders them to stdout.

use crate::persistence::{HistoryEntry, Template};
use crate::results::ResultSet;
use serde_json::Value;

/// Cells wider than this are cut with "...".
const MAX_COLUMN_WIDTH: usize = 40;

const MIN_COLUMN_WIDTH: usize = 4;

/// What a subcommand prints.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// A single status line.
    Info(String),

    /// Rows rendered as a bordered grid.
    Table {
        /// Column headers.
        headers: Vec<String>,
        /// Cell text, one vector per row.
        rows: Vec<Vec<String>>,
    },

    /// Raw JSON, pretty-printed.
    Json(Value),

    /// Several blocks printed in order.
    Multiple(Vec<CommandOutput>),
}

impl CommandOutput {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self::Table { headers, rows }
    }

    pub fn multiple(outputs: Vec<CommandOutput>) -> Self {
        Self::Multiple(outputs)
    }

    /// Table of query results with a row-count footer.
    pub fn result_set(set: &ResultSet) -> Self {
        let count = set.row_count();
        Self::multiple(vec![
            Self::table(set.columns().to_vec(), set.display_rows()),
            Self::info(format!(
                "{count} row{} returned",
                if count == 1 { "" } else { "s" }
            )),
        ])
    }

    /// History list, one line per entry.
    pub fn history(entries: &[&HistoryEntry]) -> Self {
        if entries.is_empty() {
            return Self::info("No queries in history.");
        }
        Self::table(
            vec!["ID".to_string(), "Dialect".to_string(), "Query".to_string()],
            entries
                .iter()
                .map(|e| vec![e.id.clone(), e.dialect.to_string(), e.summary()])
                .collect(),
        )
    }

    /// Template list.
    pub fn templates(templates: &[&Template]) -> Self {
        if templates.is_empty() {
            return Self::info("No templates.");
        }
        Self::table(
            ["ID", "Name", "Category", "Dialect", "Query"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            templates
                .iter()
                .map(|t| {
                    vec![
                        t.id.clone(),
                        t.name.clone(),
                        t.category.clone(),
                        t.dialect.to_string(),
                        t.query.clone(),
                    ]
                })
                .collect(),
        )
    }

    /// Renders the output as plain text.
    pub fn render(&self) -> String {
        match self {
            Self::Info(msg) => msg.clone(),
            Self::Table { headers, rows } => render_table(headers, rows),
            Self::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Multiple(outputs) => outputs
                .iter()
                .map(CommandOutput::render)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Renders a bordered text table.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return "(empty result)".to_string();
    }

    let widths = column_widths(headers, rows);
    let mut lines = Vec::with_capacity(rows.len() + 4);

    lines.push(border(&widths, '┌', '┬', '┐'));
    lines.push(row_line(headers, &widths));
    lines.push(border(&widths, '├', '┼', '┤'));
    for row in rows {
        lines.push(row_line(row, &widths));
    }
    lines.push(border(&widths, '└', '┴', '┘'));

    lines.join("\n")
}

/// Calculates the width of each column, capped at MAX_COLUMN_WIDTH.
fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|h| display_width(h).max(MIN_COLUMN_WIDTH))
        .collect();

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(display_width(cell));
            }
        }
    }

    widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
}

/// Width of a cell as rendered: newlines are flattened to spaces.
fn display_width(s: &str) -> usize {
    s.chars().count()
}

/// Flattens newlines and shortens `s` to `max_width` characters.
fn truncate(s: &str, max_width: usize) -> String {
    let flat = s.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max_width {
        flat
    } else if max_width <= 3 {
        flat.chars().take(max_width).collect()
    } else {
        let head: String = flat.chars().take(max_width - 3).collect();
        format!("{head}...")
    }
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|&w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&mid.to_string()))
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let cell = cells.get(i).map(|c| truncate(c, w)).unwrap_or_default();
            let fill = w.saturating_sub(cell.chars().count());
            format!(" {cell}{} ", " ".repeat(fill))
        })
        .collect();
    format!("│{}│", padded.join("│"))
}
