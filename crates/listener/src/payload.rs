//! Wire shape of GitHub `issues` webhook payloads.
//!
//! Every field is optional on the wire so that a payload with a missing or
//! mistyped field is reported as [`MalformedPayload`] instead of a framework
//! rejection. [`parse`] is the only way in.

use std::collections::BTreeSet;

use relay::{ExternalIssueId, GitHubIssue, Timestamp, WebhookEvent};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why an inbound webhook body could not become a [`WebhookEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPayload {
    /// Empty body, invalid JSON, or JSON that is not an object.
    #[error("No JSON data provided.")]
    NotJson,

    /// The `action` field is absent.
    #[error("Webhook payload has no action.")]
    MissingAction,

    /// A labeled or deleted event carries no usable issue id.
    #[error("Webhook payload for action '{action}' has no issue id.")]
    MissingIssueId {
        /// Action named by the payload.
        action: String,
    },

    /// A field is present with the wrong type.
    #[error("Webhook payload is malformed: {0}")]
    InvalidField(String),
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    action: Option<String>,
    label: Option<NamedRef>,
    issue: Option<IssuePayload>,
    repository: Option<RepositoryRef>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryRef {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    id: Option<ExternalIssueId>,
    title: Option<String>,
    number: Option<u64>,
    url: Option<String>,
    user: Option<UserRef>,
    labels: Option<Vec<NamedRef>>,
    state: Option<String>,
    created_at: Option<Timestamp>,
    updated_at: Option<Timestamp>,
    body: Option<String>,
}

impl IssuePayload {
    fn into_issue(self, id: ExternalIssueId) -> GitHubIssue {
        let labels: BTreeSet<String> = self
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|l| l.name)
            .collect();
        GitHubIssue {
            id,
            title: self.title.unwrap_or_default(),
            number: self.number,
            url: self.url.unwrap_or_default(),
            author: self.user.and_then(|u| u.login),
            labels,
            state: self.state.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            body: self.body,
        }
    }
}

impl WebhookPayload {
    fn into_event(self) -> Result<WebhookEvent, MalformedPayload> {
        let action = self.action.ok_or(MalformedPayload::MissingAction)?;
        let mut event = WebhookEvent::new(action);
        event.label = self.label.and_then(|l| l.name);
        event.repository_full_name = self.repository.and_then(|r| r.full_name);

        let issue = self.issue.and_then(|mut issue| {
            let id = issue.id.take().filter(|id| !id.is_empty())?;
            Some(issue.into_issue(id))
        });
        if issue.is_none() && event.action.is_synced() {
            return Err(MalformedPayload::MissingIssueId {
                action: event.action.to_string(),
            });
        }
        event.issue = issue;
        Ok(event)
    }
}

/// Parses a raw request body into a domain event.
pub fn parse(body: &[u8]) -> Result<WebhookEvent, MalformedPayload> {
    let value: Value = serde_json::from_slice(body).map_err(|_| MalformedPayload::NotJson)?;
    if !value.is_object() {
        return Err(MalformedPayload::NotJson);
    }
    let payload: WebhookPayload = serde_json::from_value(value)
        .map_err(|e| MalformedPayload::InvalidField(e.to_string()))?;
    payload.into_event()
}
