//! Response normalisation.
//!
//! The only place a [`SyncOutcome`] is turned into something a webhook caller
//! sees: an HTTP status plus a fixed JSON shape that echoes the GitHub issue id
//! and action.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ExternalIssueId, SyncOutcome, WebhookEvent};

/// Status used for failures that did not capture an HTTP status.
pub const DEFAULT_FAILURE_STATUS: u16 = 400;

/// `action_performed` value for events that led to no remote action.
pub const NO_ACTION: &str = "No action";

/// The JSON body returned for every handled webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    /// Id of the created or deleted ticket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Key of the created ticket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// `"open"`, `"delete"`, or `"No action"`.
    pub action_performed: String,
    /// The GitHub issue id from the event, in its original JSON form.
    pub github_issue_id: Option<ExternalIssueId>,
    /// The GitHub action from the event.
    pub github_issue_action: String,
    /// Failure description, for failed outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Status and body to send back to the webhook caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: ResponseBody,
}

impl NormalizedResponse {
    /// Returns the body as a JSON value.
    pub fn body_json(&self) -> Value {
        serde_json::to_value(&self.body).unwrap_or(Value::Null)
    }
}

/// Maps an outcome and its originating event to a status and body.
///
/// Created → 201, Deleted → 204, NoAction → 200, Failed → the captured
/// status or [`DEFAULT_FAILURE_STATUS`].
pub fn normalize(outcome: &SyncOutcome, event: &WebhookEvent) -> NormalizedResponse {
    let (status, id, key, action_performed, error) = match outcome {
        SyncOutcome::Created {
            ticket_id,
            ticket_key,
        } => (
            201,
            Some(ticket_id.to_string()),
            Some(ticket_key.to_string()),
            "open",
            None,
        ),
        SyncOutcome::Deleted { ticket_id } => {
            (204, Some(ticket_id.to_string()), None, "delete", None)
        }
        SyncOutcome::NoAction => (200, None, None, NO_ACTION, None),
        SyncOutcome::Failed {
            attempted,
            http_status,
            reason,
        } => (
            http_status.unwrap_or(DEFAULT_FAILURE_STATUS),
            None,
            None,
            attempted.as_str(),
            Some(reason.clone()),
        ),
    };

    NormalizedResponse {
        status,
        body: ResponseBody {
            id,
            key,
            action_performed: action_performed.to_string(),
            github_issue_id: event.issue_id().cloned(),
            github_issue_action: event.action.to_string(),
            error,
        },
    }
}

/// One-line report of an outcome, for logs.
pub fn summarize(outcome: &SyncOutcome, event: &WebhookEvent) -> String {
    let issue = event
        .issue_id()
        .map_or_else(|| "<none>".to_string(), ToString::to_string);
    match outcome {
        SyncOutcome::Created {
            ticket_id,
            ticket_key,
        } => format!(
            "Action performed: open. Created ticket {ticket_id} ({ticket_key}) from GitHub issue {issue}"
        ),
        SyncOutcome::Deleted { ticket_id } => format!(
            "Action performed: delete. Deleted ticket {ticket_id} mirroring GitHub issue {issue}"
        ),
        SyncOutcome::NoAction => format!(
            "Action performed: {NO_ACTION} for GitHub issue {issue} and GitHub action {}",
            event.action
        ),
        SyncOutcome::Failed {
            attempted,
            http_status,
            reason,
        } => format!(
            "Ticket action {attempted} failed with status {} for GitHub issue {issue}: {reason}",
            http_status.unwrap_or(DEFAULT_FAILURE_STATUS)
        ),
    }
}
