//! Query API response normalization.
//!
//! The API answers either with a bare list of row objects or with an object
//! whose `data` field holds the rows. This module decodes both shapes and
//! builds the row set handed to the table and chart views.

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Column name used for rows that are not JSON objects.
const SCALAR_COLUMN: &str = "value";

/// The two response shapes the query API produces.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// `{"data": ..., ...}`; sibling keys such as `meta` are kept.
    Wrapped { data: Value, rest: Map<String, Value> },
    /// Any other JSON value, used as-is.
    Bare(Value),
}

impl ApiResponse {
    /// Detects the shape of a decoded response body.
    pub fn detect(body: Value) -> Self {
        match body {
            Value::Object(mut map) if map.contains_key("data") => {
                let data = map.remove("data").unwrap_or(Value::Null);
                Self::Wrapped { data, rest: map }
            }
            other => Self::Bare(other),
        }
    }

    /// Returns the payload that carries the rows.
    pub fn into_payload(self) -> Value {
        match self {
            Self::Wrapped { data, .. } => data,
            Self::Bare(value) => value,
        }
    }
}

/// Result of normalizing a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// At least one row came back.
    Rows(Vec<Value>),
    /// The query succeeded but produced nothing to show.
    Empty,
}

impl Normalized {
    /// Returns true for the "succeeded, no rows" case.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Extracts the row list from a response body.
///
/// A `data` key is unwrapped; a single object becomes a one-row list;
/// `null`, `[]` and `{}` mean no rows.
pub fn normalize(body: Value) -> Normalized {
    match ApiResponse::detect(body).into_payload() {
        Value::Null => Normalized::Empty,
        Value::Array(rows) if rows.is_empty() => Normalized::Empty,
        Value::Array(rows) => Normalized::Rows(rows),
        Value::Object(map) if map.is_empty() => Normalized::Empty,
        other => Normalized::Rows(vec![other]),
    }
}

/// Tabular view over normalized rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl ResultSet {
    /// Builds a result set; `None` when there is nothing to show.
    pub fn from_normalized(normalized: Normalized) -> Option<Self> {
        match normalized {
            Normalized::Rows(rows) => Some(Self::from_rows(rows)),
            Normalized::Empty => None,
        }
    }

    /// Builds a result set from raw rows.
    ///
    /// Columns appear in first-seen order across all rows.
    pub fn from_rows(rows: Vec<Value>) -> Self {
        let rows: Vec<Map<String, Value>> = rows
            .into_iter()
            .map(|row| match row {
                Value::Object(map) => map,
                scalar => {
                    let mut map = Map::new();
                    map.insert(SCALAR_COLUMN.to_string(), scalar);
                    map
                }
            })
            .collect();

        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        Self { columns, rows }
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw rows.
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Display text of one cell. Missing and null cells are empty.
    pub fn cell(&self, row: usize, column: &str) -> String {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(display_value)
            .unwrap_or_default()
    }

    /// All cells of every row, in column order, as display text.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        (0..self.rows.len())
            .map(|i| self.columns.iter().map(|c| self.cell(i, c)).collect())
            .collect()
    }

    /// Columns whose non-null values are all numbers (at least one present).
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| {
                let mut seen_number = false;
                for row in &self.rows {
                    match row.get(column.as_str()) {
                        Some(Value::Number(_)) => seen_number = true,
                        None | Some(Value::Null) => {}
                        Some(_) => return false,
                    }
                }
                seen_number
            })
            .map(String::as_str)
            .collect()
    }

    /// Charts need at least one numeric column for the Y axis.
    pub fn can_chart(&self) -> bool {
        !self.numeric_columns().is_empty()
    }

    /// Numeric values of a column; non-numeric cells become `None`.
    pub fn numeric_values(&self, column: &str) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|r| r.get(column).and_then(Value::as_f64))
            .collect()
    }
}

/// Renders a JSON value for a table cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Chart kinds offered by the chart view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Scatter,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [Self::Bar, Self::Line, Self::Scatter, Self::Pie];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Scatter => "scatter",
            Self::Pie => "pie",
        }
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                format!("Invalid chart kind: {s}. Expected: bar, line, scatter, or pie")
            })
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// X/Y column picks for the chart view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSelection {
    pub x: String,
    pub y: String,
}

impl AxisSelection {
    /// Picks axes for a new result set, keeping previous picks that still apply.
    ///
    /// X may be any column; Y must be numeric. Returns `None` when the result
    /// cannot be charted.
    pub fn choose(
        result: &ResultSet,
        previous_x: Option<&str>,
        previous_y: Option<&str>,
    ) -> Option<Self> {
        let numeric = result.numeric_columns();
        let y = previous_y
            .filter(|p| numeric.contains(p))
            .or_else(|| numeric.first().copied())?;

        let x = previous_x
            .filter(|p| result.columns().iter().any(|c| c == p))
            .or_else(|| result.columns().first().map(String::as_str))?;

        Some(Self {
            x: x.to_string(),
            y: y.to_string(),
        })
    }
}
