//! Error types for the synchronisation domain.
//!
//! [`TicketClientError`] is what a [`crate::TicketClient`] implementation
//! reports when a request never produced a response. [`SyncError`] covers every
//! condition that turns a webhook event into [`crate::SyncOutcome::Failed`].
//! None of these errors are retried by the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ExternalIssueId, ProjectKey};

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

/// A request to the ticket API failed before a response was received.
///
/// Non-success HTTP statuses are *not* errors at this level; they come back as
/// an [`crate::ApiResponse`] and are judged by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TicketClientError {
    /// Connection, TLS, or timeout failure.
    #[error("Transport error during {operation}: {message}")]
    Transport {
        /// Endpoint name of the request that failed.
        operation: String,
        /// Description of the underlying failure.
        message: String,
    },

    /// The request could not be built (unknown endpoint, bad path parameter).
    #[error("Invalid request for {operation}: {message}")]
    InvalidRequest {
        /// Endpoint name of the request that failed.
        operation: String,
        /// What was wrong with the request.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Sync errors
// ---------------------------------------------------------------------------

/// Errors that end the handling of a webhook event with a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The idempotency search matched more than one ticket for one GitHub
    /// issue. The engine refuses to pick one.
    #[error("Found {matches} tickets for GitHub issue {external_id} in project {project}")]
    LookupAmbiguity {
        /// Project that was searched.
        project: ProjectKey,
        /// GitHub issue id that was searched for.
        external_id: ExternalIssueId,
        /// Number of matches reported by the search.
        matches: u64,
    },

    /// The issue type named in the issue body (or the default) does not exist
    /// in the project.
    #[error("Issue type {name} does not exist in project {project}")]
    UnresolvedIssueType {
        /// Requested type name.
        name: String,
        /// Project whose issue types were searched.
        project: ProjectKey,
    },

    /// The ticket API answered with a non-success status.
    #[error("{operation} failed with status {status}: {detail}")]
    RemoteCall {
        /// Endpoint name of the failed call.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the response body.
        detail: String,
    },

    /// The ticket API answered successfully but the body was unusable.
    #[error("{operation} returned an unexpected body: {reason}")]
    MalformedResponse {
        /// Endpoint name of the call.
        operation: &'static str,
        /// What was missing or wrongly typed.
        reason: String,
    },

    /// The request never produced a response.
    #[error(transparent)]
    Client(#[from] TicketClientError),
}

impl SyncError {
    /// Returns the HTTP status to propagate to the webhook caller, if the
    /// failure carried one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::RemoteCall { status, .. } => Some(*status),
            Self::LookupAmbiguity { .. }
            | Self::UnresolvedIssueType { .. }
            | Self::MalformedResponse { .. }
            | Self::Client(_) => None,
        }
    }
}
