//! Synchronisation domain for issue-relay.
//!
//! This crate decides what a GitHub issue webhook event means for the remote
//! ticket tracker: create a ticket, delete one, or do nothing. It owns the
//! idempotency lookup that prevents duplicate tickets, the mapping of issue
//! fields onto the tracker's create schema, and the normalisation of outcomes
//! into webhook responses.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! The remote tracker is reached only through the [`TicketClient`] trait;
//! infrastructure crates supply the implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProjectKey`, `TicketId`, `ExternalIssueId`, ...) |
//! | [`types`] | Webhook events, projects, tickets, `SyncOutcome` |
//! | [`errors`] | `SyncError` and `TicketClientError` |
//! | [`ports`] | The `TicketClient` trait and `ApiResponse` |
//! | [`engine`] | `SyncEngine`: the per-event decision |
//! | [`lookup`] | Idempotency lookup by JQL search |
//! | [`creation`] | Create-schema field mapping |
//! | [`description`] | Ticket description text and document format |
//! | [`metadata`] | Project, issue type, and ticket reads |
//! | [`response`] | Outcome → status + JSON body |

pub mod creation;
pub mod description;
pub mod engine;
pub mod errors;
pub mod identifiers;
pub mod lookup;
pub mod metadata;
pub mod ports;
pub mod response;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use engine::{ProjectSource, SyncEngine, SyncSettings, DEFAULT_SYNC_LABEL};
pub use errors::{SyncError, TicketClientError};
pub use identifiers::{
    AccountId, ExternalIssueId, IssueTypeId, ProjectId, ProjectKey, SyncRunId, TicketId, TicketKey,
};
pub use ports::{ApiResponse, TicketClient};
pub use response::{normalize, summarize, NormalizedResponse, ResponseBody};
pub use types::{
    FieldSpec, GitHubIssue, IssueAction, IssueType, Project, ProjectLead, RemoteTicket,
    SyncAction, SyncOutcome, Timestamp, WebhookEvent,
};
