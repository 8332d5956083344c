//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`TicketId`] with a [`TicketKey`] even though both are strings under the
//! hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — remote ticket service (string-backed)
// ---------------------------------------------------------------------------

string_id! {
    /// Key of a remote project (e.g. `"CD"`).
    ///
    /// Every ticket the relay creates or deletes lives in exactly one project,
    /// selected by configuration.
    ProjectKey
}

string_id! {
    /// Numeric identifier of a remote project, as returned by the ticket API
    /// (e.g. `"10002"`).
    ProjectId
}

string_id! {
    /// Identifier of a remote ticket (e.g. `"10042"`).
    ///
    /// Deletion always addresses a ticket by this id, never by key.
    TicketId
}

string_id! {
    /// Human-facing key of a remote ticket (e.g. `"CD-17"`).
    TicketKey
}

string_id! {
    /// Identifier of an issue type within a project (e.g. `"10004"` for `"Bug"`).
    IssueTypeId
}

string_id! {
    /// Account identifier of a remote user (project lead, reporter).
    AccountId
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub
// ---------------------------------------------------------------------------

/// Identifies the GitHub issue a webhook event refers to.
///
/// GitHub sends the id as a JSON number; replayed or hand-written payloads
/// sometimes carry it as a string. Both forms are accepted and the original
/// form is preserved when the id is echoed back in a response body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalIssueId {
    /// Id delivered as a JSON number.
    Numeric(u64),
    /// Id delivered as a JSON string.
    Text(String),
}

impl ExternalIssueId {
    /// Returns `true` if the id carries no usable value (an empty string).
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl From<u64> for ExternalIssueId {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for ExternalIssueId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl std::fmt::Display for ExternalIssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies the handling of a single webhook delivery.
///
/// Generated fresh for every event handed to the engine; recorded on the
/// tracing span so all remote calls made for one delivery can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncRunId(Uuid);

impl SyncRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SyncRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
