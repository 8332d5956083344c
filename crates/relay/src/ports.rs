//! The ticket client port.
//!
//! The engine talks to the remote tracker only through [`TicketClient`].
//! Implementations (the `jira` crate, test fakes) own transport,
//! authentication, and endpoint layout; the engine owns interpretation of
//! statuses and bodies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{IssueTypeId, ProjectKey, SyncError, TicketClientError, TicketId};

/// Status and parsed body of one ticket API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body. [`Value::Null`] for an empty body; a
    /// [`Value::String`] holding the raw text when the body was not JSON.
    pub body: Value,
}

impl ApiResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body of a successful response, or a
    /// [`SyncError::RemoteCall`] carrying the status and the API's error text.
    pub fn into_success(self, operation: &'static str) -> Result<Value, SyncError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(SyncError::RemoteCall {
                operation,
                status: self.status,
                detail: error_detail(&self.body),
            })
        }
    }
}

/// Extracts a readable message from a ticket API error body.
///
/// Understands the `{"errorMessages": [...], "errors": {field: msg}}` shape;
/// anything else is rendered as compact JSON.
fn error_detail(body: &Value) -> String {
    let mut parts: Vec<String> = body
        .get("errorMessages")
        .and_then(Value::as_array)
        .map(|msgs| msgs.iter().filter_map(Value::as_str).map(str::to_owned).collect())
        .unwrap_or_default();

    if let Some(fields) = body.get("errors").and_then(Value::as_object) {
        parts.extend(
            fields
                .iter()
                .map(|(field, msg)| format!("{field}: {}", msg.as_str().unwrap_or_default())),
        );
    }

    if !parts.is_empty() {
        return parts.join("; ");
    }
    match body {
        Value::Null => "empty response body".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Capabilities the engine needs from the remote ticket service.
///
/// Every method returns the response whatever its status; only failures to
/// obtain a response are errors.
#[async_trait]
pub trait TicketClient: Send + Sync {
    /// Fetches a project by key.
    async fn get_project(&self, key: &ProjectKey) -> Result<ApiResponse, TicketClientError>;

    /// Lists the issue types available for ticket creation in a project.
    async fn get_issue_types(
        &self,
        project: &ProjectKey,
    ) -> Result<ApiResponse, TicketClientError>;

    /// Fetches the create-field schema of one issue type.
    async fn get_issue_type_schema(
        &self,
        project: &ProjectKey,
        issue_type: &IssueTypeId,
    ) -> Result<ApiResponse, TicketClientError>;

    /// Runs a JQL search.
    async fn search_by_query(&self, query: &str) -> Result<ApiResponse, TicketClientError>;

    /// Creates a ticket from a `{"fields": {...}}` payload.
    async fn create_ticket(&self, payload: &Value) -> Result<ApiResponse, TicketClientError>;

    /// Deletes a ticket by id.
    async fn delete_ticket(&self, id: &TicketId) -> Result<ApiResponse, TicketClientError>;

    /// Fetches a ticket by id or key.
    async fn get_ticket(&self, id_or_key: &str) -> Result<ApiResponse, TicketClientError>;
}
