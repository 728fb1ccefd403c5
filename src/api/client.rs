//! HTTP client for the query-execution API.
//!
//! Implements the QueryApi trait over reqwest. No retries: every failure is
//! reported once to the caller, and no placeholder data is ever produced.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, info_span, Instrument, Span};
use url::Url;

use crate::api::{QueryApi, QueryRequest, EXECUTE_PATH};
use crate::error::{QueryDeskError, Result};
use crate::persistence::ConnectionConfig;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Production API used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://querybuilder.vercel.app";

/// Characters of a response body echoed into the log.
const LOGGED_BODY_CHARS: usize = 500;

/// API client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Base URL of the query API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiClientConfig {
    /// Creates a config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Query API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiClientConfig,
    endpoint: Url,
    client: Client,
    span: Span,
}

impl ApiClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        Self::with_span(config, info_span!("api_client"))
    }

    /// Creates a new client that logs within the given span.
    pub fn with_span(config: ApiClientConfig, span: Span) -> Result<Self> {
        let endpoint = endpoint_url(&config.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QueryDeskError::internal(format!("Failed to create HTTP client: {e}")))?;

        span.in_scope(|| info!("API client initialized with base URL: {}", config.base_url));

        Ok(Self {
            config,
            endpoint,
            client,
            span,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Returns the execution endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, request: &QueryRequest) -> Result<Value> {
        info!("Sending request to API: {}", self.endpoint);
        if let Ok(payload) = serde_json::to_string_pretty(request) {
            debug!("Request payload: {payload}");
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    QueryDeskError::api_connection(format!(
                        "Request timed out after {}s",
                        self.config.timeout_secs
                    ))
                } else if e.is_connect() {
                    QueryDeskError::api_connection(format!(
                        "Failed to connect to {}: {e}",
                        self.config.base_url
                    ))
                } else {
                    QueryDeskError::api_connection(format!("Request failed: {e}"))
                };
                error!("{err}");
                err
            })?;

        let status = response.status();
        info!("API response status code: {}", status.as_u16());

        let body = response.text().await.map_err(|e| {
            QueryDeskError::api_connection(format!("Failed to read response: {e}"))
        })?;
        debug!(
            "API response content: {}",
            body.chars().take(LOGGED_BODY_CHARS).collect::<String>()
        );

        // Only 200 carries rows; any other status, 2xx included, is an API error.
        if status != StatusCode::OK {
            let err = QueryDeskError::api_status(status.as_u16(), body);
            error!("{err}");
            return Err(err);
        }

        parse_body(&body)
    }
}

#[async_trait]
impl QueryApi for ApiClient {
    async fn execute(
        &self,
        query: &str,
        config: &ConnectionConfig,
        read_only: bool,
    ) -> Result<Value> {
        let request = QueryRequest::new(query, config, read_only);
        if request.query != query {
            self.span.in_scope(|| {
                info!(
                    "Processed {} query with table name substitution: {}",
                    config.dialect, config.table_name
                )
            });
        }

        self.send(&request).instrument(self.span.clone()).await
    }
}

/// Resolves the execution endpoint under a base URL.
fn endpoint_url(base_url: &str) -> Result<Url> {
    let base = Url::parse(base_url.trim())
        .map_err(|e| QueryDeskError::config(format!("Invalid API base URL '{base_url}': {e}")))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(QueryDeskError::config(format!(
            "Invalid API scheme '{}'. Expected 'http' or 'https'",
            base.scheme()
        )));
    }

    let joined = format!("{}{EXECUTE_PATH}", base.as_str().trim_end_matches('/'));
    Url::parse(&joined)
        .map_err(|e| QueryDeskError::config(format!("Invalid API endpoint '{joined}': {e}")))
}

/// Decodes a success body. A blank body counts as JSON `null`.
fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(body)
        .map_err(|e| QueryDeskError::api_response(format!("Failed to parse response: {e}")))
}
