//! Shared value types for the synchronisation domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the content of webhook events, remote projects, and remote tickets, and
//! participate in the sync decision.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, ExternalIssueId, IssueTypeId, ProjectId, ProjectKey, TicketId, TicketKey};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Displays in the `2024-06-20T10:00:00Z` form GitHub uses, keeping
/// any fractional seconds the source carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

// ---------------------------------------------------------------------------
// Webhook events
// ---------------------------------------------------------------------------

/// The `action` field of a GitHub `issues` webhook event.
///
/// Only [`IssueAction::Labeled`] and [`IssueAction::Deleted`] can lead to a
/// remote call; every other action is answered with "No action". Unknown
/// actions are kept verbatim so they can be echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueAction {
    /// `opened`
    Opened,
    /// `edited`
    Edited,
    /// `closed`
    Closed,
    /// `reopened`
    Reopened,
    /// `labeled`
    Labeled,
    /// `unlabeled`
    Unlabeled,
    /// `deleted`
    Deleted,
    /// Any other action string GitHub sends (`assigned`, `milestoned`, ...).
    Other(String),
}

impl IssueAction {
    /// Returns the action exactly as GitHub spells it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Edited => "edited",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Labeled => "labeled",
            Self::Unlabeled => "unlabeled",
            Self::Deleted => "deleted",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` for the actions the relay synchronises.
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Labeled | Self::Deleted)
    }
}

impl From<String> for IssueAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "opened" => Self::Opened,
            "edited" => Self::Edited,
            "closed" => Self::Closed,
            "reopened" => Self::Reopened,
            "labeled" => Self::Labeled,
            "unlabeled" => Self::Unlabeled,
            "deleted" => Self::Deleted,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for IssueAction {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<IssueAction> for String {
    fn from(value: IssueAction) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for IssueAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the GitHub issue carried by a webhook event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubIssue {
    /// GitHub's global issue id. Embedded in the remote ticket's description
    /// and used as the idempotency key.
    pub id: ExternalIssueId,

    /// Issue title; becomes the ticket summary.
    pub title: String,

    /// Repository-local issue number (`#17`).
    pub number: Option<u64>,

    /// API URL of the issue.
    pub url: String,

    /// Login of the user who opened the issue.
    pub author: Option<String>,

    /// Names of the labels currently applied to the issue.
    pub labels: BTreeSet<String>,

    /// `open` or `closed`.
    pub state: String,

    /// When the issue was created on GitHub.
    pub created_at: Option<Timestamp>,

    /// When the issue was last updated on GitHub.
    pub updated_at: Option<Timestamp>,

    /// Markdown body. `None` when the issue was opened without a description.
    pub body: Option<String>,
}

impl GitHubIssue {
    /// Creates an issue snapshot with only the id and title set.
    pub fn new(id: impl Into<ExternalIssueId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            number: None,
            url: String::new(),
            author: None,
            labels: BTreeSet::new(),
            state: String::new(),
            created_at: None,
            updated_at: None,
            body: None,
        }
    }
}

/// A GitHub `issues` webhook event, immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// What happened to the issue.
    pub action: IssueAction,

    /// Name of the label that was added, for `labeled` events.
    pub label: Option<String>,

    /// The issue the event refers to.
    ///
    /// Always present for synced actions once the receiver has validated the
    /// payload; other actions may arrive without one.
    pub issue: Option<GitHubIssue>,

    /// `owner/repo` of the repository the issue lives in.
    pub repository_full_name: Option<String>,
}

impl WebhookEvent {
    /// Creates an event for `action` with no label, issue, or repository.
    pub fn new(action: impl Into<IssueAction>) -> Self {
        Self {
            action: action.into(),
            label: None,
            issue: None,
            repository_full_name: None,
        }
    }

    /// Sets the label that triggered a `labeled` event.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attaches the issue snapshot.
    pub fn with_issue(mut self, issue: GitHubIssue) -> Self {
        self.issue = Some(issue);
        self
    }

    /// Returns the id of the issue the event refers to, if any.
    pub fn issue_id(&self) -> Option<&ExternalIssueId> {
        self.issue.as_ref().map(|i| &i.id)
    }
}

// ---------------------------------------------------------------------------
// Remote project metadata
// ---------------------------------------------------------------------------

/// The lead of a remote project. New tickets are reported as this user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLead {
    /// Account id of the lead.
    pub account_id: AccountId,
    /// Display name of the lead.
    #[serde(default)]
    pub display_name: String,
}

/// A remote project, as returned by the ticket API or read from a project
/// catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Numeric project id.
    pub id: ProjectId,
    /// Project key.
    pub key: ProjectKey,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-text project description.
    #[serde(default)]
    pub description: String,
    /// `software`, `business`, ...
    #[serde(default)]
    pub project_type_key: String,
    /// Project lead.
    pub lead: ProjectLead,
}

/// An issue type available in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueType {
    /// Type id used in create payloads.
    pub id: IssueTypeId,
    /// Display name (`"Bug"`, `"Task"`, ...). Matched case-sensitively.
    pub name: String,
}

/// One field of an issue type's create schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Field identifier (`"summary"`, `"customfield_10020"`, ...).
    pub field_id: String,
    /// Whether the remote API rejects a create request without this field.
    #[serde(default)]
    pub required: bool,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Remote tickets
// ---------------------------------------------------------------------------

/// A ticket in the remote tracker that mirrors a GitHub issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTicket {
    /// Ticket id.
    pub id: TicketId,
    /// Ticket key.
    pub key: TicketKey,
    /// Project the ticket belongs to.
    pub project_key: Option<ProjectKey>,
    /// Ticket summary (the GitHub issue title).
    pub title: String,
    /// Plain-text description. Contains the `githubIssueId: <id>` line for
    /// tickets created by the relay.
    pub description: String,
    /// Reporter account id.
    pub reporter_id: Option<AccountId>,
    /// Issue type id.
    pub issue_type_id: Option<IssueTypeId>,
}

// ---------------------------------------------------------------------------
// Sync results
// ---------------------------------------------------------------------------

/// A remote action the engine can carry out for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Create a ticket for the issue.
    Open,
    /// Delete the issue's ticket.
    Delete,
}

impl SyncAction {
    /// Returns the name reported in `action_performed`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handling one webhook event. Produced exactly once per event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// A ticket was created for the issue.
    Created {
        /// Id of the new ticket.
        ticket_id: TicketId,
        /// Key of the new ticket.
        ticket_key: TicketKey,
    },
    /// The issue's ticket was deleted.
    Deleted {
        /// Id of the deleted ticket.
        ticket_id: TicketId,
    },
    /// Nothing needed doing.
    NoAction,
    /// A remote call failed or returned data the engine could not use.
    Failed {
        /// The action that was being carried out.
        attempted: SyncAction,
        /// HTTP status returned by the ticket API, when the failure was a
        /// non-success response.
        http_status: Option<u16>,
        /// Human-readable description of the failure.
        reason: String,
    },
}
