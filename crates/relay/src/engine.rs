//! The sync decision engine.
//!
//! [`SyncEngine::handle`] turns one webhook event into one [`SyncOutcome`]:
//!
//! 1. Decide from the event alone whether any remote action is possible
//!    (`labeled` with the sync label → open, `deleted` → delete). Everything
//!    else is [`SyncOutcome::NoAction`] without a remote call.
//! 2. Resolve the target project.
//! 3. Look up the ticket already mirroring the issue ([`crate::lookup`]).
//! 4. Open only when no ticket exists; delete only when one does.
//!
//! Any failure along the way becomes [`SyncOutcome::Failed`]. Nothing is
//! retried, and create and delete are each a single remote call.
//!
//! ## Concurrency
//!
//! The engine holds no mutable state. Two deliveries for the same issue that
//! run concurrently can both observe "no ticket" and both create one; the
//! remote tracker offers no uniqueness constraint or lock to close that
//! window.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{error, info, instrument, warn, Span};

use crate::{
    creation, lookup, metadata, GitHubIssue, IssueAction, Project, ProjectKey, RemoteTicket,
    SyncAction, SyncError, SyncOutcome, SyncRunId, TicketClient, WebhookEvent,
};

/// Label that marks a GitHub issue for synchronisation unless configured
/// otherwise.
pub const DEFAULT_SYNC_LABEL: &str = "sync-to-jira";

/// Where the engine gets the target project from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSource {
    /// Fetch the project with this key from the ticket API on every event.
    Remote(ProjectKey),
    /// Use a project loaded once at start-up (e.g. from a catalog file).
    Fixed(Project),
}

impl ProjectSource {
    /// Returns the key of the target project.
    pub fn key(&self) -> &ProjectKey {
        match self {
            Self::Remote(key) => key,
            Self::Fixed(project) => &project.key,
        }
    }
}

/// Engine configuration, built once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Target project.
    pub project: ProjectSource,
    /// Label whose addition opens a ticket.
    pub sync_label: String,
    /// Issue type used when the issue body names none.
    pub default_issue_type: String,
}

impl SyncSettings {
    /// Settings targeting `project` with the default sync label and issue type.
    pub fn new(project: ProjectSource) -> Self {
        Self {
            project,
            sync_label: DEFAULT_SYNC_LABEL.to_string(),
            default_issue_type: creation::DEFAULT_ISSUE_TYPE.to_string(),
        }
    }

    /// Overrides the sync label.
    pub fn with_sync_label(mut self, label: impl Into<String>) -> Self {
        self.sync_label = label.into();
        self
    }

    /// Overrides the default issue type.
    pub fn with_default_issue_type(mut self, name: impl Into<String>) -> Self {
        self.default_issue_type = name.into();
        self
    }
}

/// Decides and carries out the remote action for each webhook event.
pub struct SyncEngine {
    client: Arc<dyn TicketClient>,
    settings: SyncSettings,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Creates an engine over `client`.
    pub fn new(client: Arc<dyn TicketClient>, settings: SyncSettings) -> Self {
        Self { client, settings }
    }

    /// Returns the engine's settings.
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Returns the action the event asks for, judged from the event alone.
    fn intent(&self, event: &WebhookEvent) -> Option<SyncAction> {
        match &event.action {
            IssueAction::Labeled => event
                .label
                .as_deref()
                .filter(|label| *label == self.settings.sync_label)
                .map(|_| SyncAction::Open),
            IssueAction::Deleted => Some(SyncAction::Delete),
            _ => None,
        }
    }

    /// Handles one webhook event.
    #[instrument(
        skip_all,
        fields(
            run_id = %SyncRunId::new_random(),
            action = %event.action,
            issue_id = tracing::field::Empty,
        )
    )]
    pub async fn handle(&self, event: &WebhookEvent) -> SyncOutcome {
        let Some(intent) = self.intent(event) else {
            info!(label = ?event.label, "event does not call for a remote action");
            return SyncOutcome::NoAction;
        };
        let Some(issue) = event.issue.as_ref().filter(|i| !i.id.is_empty()) else {
            warn!("synced event carries no issue id; ignoring");
            return SyncOutcome::NoAction;
        };
        Span::current().record("issue_id", tracing::field::display(&issue.id));

        match self.execute(intent, issue).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, attempted = %intent, "sync failed");
                SyncOutcome::Failed {
                    attempted: intent,
                    http_status: err.http_status(),
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn execute(
        &self,
        intent: SyncAction,
        issue: &GitHubIssue,
    ) -> Result<SyncOutcome, SyncError> {
        let project = self.resolve_project().await?;
        let existing = lookup::exists(self.client.as_ref(), &project.key, &issue.id).await?;

        match (intent, existing) {
            (SyncAction::Open, None) => {
                let ticket = creation::create(
                    self.client.as_ref(),
                    issue,
                    &project,
                    &self.settings.default_issue_type,
                )
                .await?;
                Ok(SyncOutcome::Created {
                    ticket_id: ticket.id,
                    ticket_key: ticket.key,
                })
            }
            (SyncAction::Open, Some(ticket_id)) => {
                info!(%ticket_id, "ticket already exists; not creating a duplicate");
                Ok(SyncOutcome::NoAction)
            }
            (SyncAction::Delete, Some(ticket_id)) => {
                self.client
                    .delete_ticket(&ticket_id)
                    .await?
                    .into_success("delete_issue")?;
                info!(%ticket_id, "deleted ticket");
                Ok(SyncOutcome::Deleted { ticket_id })
            }
            (SyncAction::Delete, None) => {
                info!("no ticket mirrors the deleted issue");
                Ok(SyncOutcome::NoAction)
            }
        }
    }

    async fn resolve_project(&self) -> Result<Cow<'_, Project>, SyncError> {
        match &self.settings.project {
            ProjectSource::Fixed(project) => Ok(Cow::Borrowed(project)),
            ProjectSource::Remote(key) => metadata::fetch_project(self.client.as_ref(), key)
                .await
                .map(Cow::Owned),
        }
    }

    /// Fetches a project's metadata from the ticket API.
    pub async fn project(&self, key: &ProjectKey) -> Result<Project, SyncError> {
        metadata::fetch_project(self.client.as_ref(), key).await
    }

    /// Fetches a ticket by id or key.
    pub async fn ticket(&self, id_or_key: &str) -> Result<RemoteTicket, SyncError> {
        metadata::fetch_ticket(self.client.as_ref(), id_or_key).await
    }
}
