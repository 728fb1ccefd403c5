//! Error types for querydesk.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for querydesk operations.
#[derive(Error, Debug)]
pub enum QueryDeskError {
    /// The query API answered with a non-success status.
    #[error("API error ({status}): {body}")]
    ApiStatus {
        /// HTTP status code returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The query API could not be reached (refused, DNS, timeout, etc.)
    #[error("Connection error: {0}")]
    ApiConnection(String),

    /// The query API answered 200 but the body was not usable JSON.
    #[error("Response error: {0}")]
    ApiResponse(String),

    /// Query input rejected before sending (empty query, missing table name, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Template catalog errors (duplicate ids, missing required fields).
    #[error("Template error: {0}")]
    Template(String),

    /// History log errors (unknown entry ids).
    #[error("History error: {0}")]
    History(String),

    /// Configuration errors (invalid settings file, bad base URL, unknown dialect, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryDeskError {
    /// Creates an API status error from a status code and raw body.
    pub fn api_status(status: u16, body: impl Into<String>) -> Self {
        Self::ApiStatus {
            status,
            body: body.into(),
        }
    }

    /// Creates a connection error with the given message.
    pub fn api_connection(msg: impl Into<String>) -> Self {
        Self::ApiConnection(msg.into())
    }

    /// Creates a response decoding error with the given message.
    pub fn api_response(msg: impl Into<String>) -> Self {
        Self::ApiResponse(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a template error with the given message.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    /// Creates a history error with the given message.
    pub fn history(msg: impl Into<String>) -> Self {
        Self::History(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ApiStatus { .. } => "API Error",
            Self::ApiConnection(_) => "Connection Error",
            Self::ApiResponse(_) => "Response Error",
            Self::Query(_) => "Query Error",
            Self::Template(_) => "Template Error",
            Self::History(_) => "History Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for failures reaching or talking to the query API.
    pub fn is_api(&self) -> bool {
        matches!(
            self,
            Self::ApiStatus { .. } | Self::ApiConnection(_) | Self::ApiResponse(_)
        )
    }
}

/// Result type alias using QueryDeskError.
pub type Result<T> = std::result::Result<T, QueryDeskError>;
