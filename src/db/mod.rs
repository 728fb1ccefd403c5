//! Database dialects understood by the query API.
//!
//! The dialect selects query syntax, placeholder handling, and the canned
//! hints shown next to the connection field.

use crate::error::QueryDeskError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported database dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Mysql,
    Mongodb,
}

impl Dialect {
    /// All dialects, in the order the picker lists them.
    pub const ALL: [Dialect; 3] = [Self::Postgres, Self::Mysql, Self::Mongodb];

    /// Returns the dialect as stored on disk and sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Mongodb => "mongodb",
        }
    }

    /// Returns the human-facing name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Postgres => "PostgreSQL",
            Self::Mysql => "MySQL",
            Self::Mongodb => "MongoDB",
        }
    }

    /// Parses a dialect from its stored or display name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" => Some(Self::Postgres),
            "mongo" => Some(Self::Mongodb),
            name => Self::ALL.into_iter().find(|d| d.as_str() == name),
        }
    }

    /// Returns the default server port for this dialect.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Mysql => 3306,
            Self::Mongodb => 27017,
        }
    }

    /// Returns the URL scheme used in connection strings.
    pub fn url_scheme(&self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::Mysql => "mysql",
            Self::Mongodb => "mongodb",
        }
    }

    /// Returns true when `{table_name}` placeholders are rewritten before sending.
    pub fn substitutes_table_name(&self) -> bool {
        matches!(self, Self::Postgres)
    }
}

impl FromStr for Dialect {
    type Err = QueryDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            QueryDeskError::config(format!(
                "Unknown dialect: {s}. Expected: postgres, mysql, or mongodb"
            ))
        })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
