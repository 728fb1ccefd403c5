//! Mock query API for testing.
//!
//! Returns a canned outcome for every request and records what was sent.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};

use crate::api::{QueryApi, QueryRequest};
use crate::error::{QueryDeskError, Result};
use crate::persistence::ConnectionConfig;

/// What the mock answers with.
#[derive(Debug, Clone)]
enum MockOutcome {
    Respond(Value),
    Status(u16, String),
    Unreachable(String),
}

/// Mock API client that never touches the network.
#[derive(Debug)]
pub struct MockQueryApi {
    outcome: MockOutcome,
    requests: Mutex<Vec<QueryRequest>>,
}

impl MockQueryApi {
    /// Creates a mock answering `{"data": []}` to everything.
    pub fn new() -> Self {
        Self::responding(json!({"data": []}))
    }

    /// Creates a mock that answers every request with `body`.
    pub fn responding(body: Value) -> Self {
        Self::with_outcome(MockOutcome::Respond(body))
    }

    /// Creates a mock that fails every request with an API status error.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Status(status, body.into()))
    }

    /// Creates a mock that behaves like an unreachable server.
    pub fn unreachable(cause: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Unreachable(cause.into()))
    }

    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<QueryRequest>> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.lock().clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<QueryRequest> {
        self.lock().last().cloned()
    }
}

impl Default for MockQueryApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryApi for MockQueryApi {
    async fn execute(
        &self,
        query: &str,
        config: &ConnectionConfig,
        read_only: bool,
    ) -> Result<Value> {
        self.lock()
            .push(QueryRequest::new(query, config, read_only));

        match &self.outcome {
            MockOutcome::Respond(body) => Ok(body.clone()),
            MockOutcome::Status(status, body) => {
                Err(QueryDeskError::api_status(*status, body.clone()))
            }
            MockOutcome::Unreachable(cause) => Err(QueryDeskError::api_connection(cause.clone())),
        }
    }
}
