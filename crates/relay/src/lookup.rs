//! Idempotency lookup: finds the ticket that already mirrors a GitHub issue.
//!
//! The search is the only guard against duplicate tickets. It is issued fresh
//! for every decision and its result is never cached.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{description, ExternalIssueId, ProjectKey, SyncError, TicketClient, TicketId};

const OP: &str = "search_for_issues_using_JQL";

/// Quotes a value as a JQL string literal.
fn jql_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Builds the JQL query that finds tickets in `project` whose description
/// contains the `githubIssueId: <id>` line for `external_id`.
///
/// The line is searched as a phrase so that `githubIssueId: 42` does not match
/// a ticket for issue `4`.
pub fn build_query(project: &ProjectKey, external_id: &ExternalIssueId) -> String {
    let phrase = jql_quote(&description::issue_id_line(external_id));
    format!(
        "project = {} AND description ~ {}",
        jql_quote(project.as_str()),
        jql_quote(&phrase)
    )
}

#[derive(Deserialize)]
struct SearchPage {
    total: Option<u64>,
    #[serde(default)]
    issues: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: TicketId,
}

/// Returns the id of the ticket mirroring `external_id` in `project`, or
/// `None` when there is none.
///
/// More than one match is a data inconsistency and is reported as
/// [`SyncError::LookupAmbiguity`] rather than resolved by picking one.
pub async fn exists(
    client: &dyn TicketClient,
    project: &ProjectKey,
    external_id: &ExternalIssueId,
) -> Result<Option<TicketId>, SyncError> {
    let query = build_query(project, external_id);
    debug!(%query, "searching for existing ticket");

    let body = client.search_by_query(&query).await?.into_success(OP)?;
    let page: SearchPage = serde_json::from_value(body).map_err(|e| SyncError::MalformedResponse {
        operation: OP,
        reason: e.to_string(),
    })?;

    let matches = page.total.unwrap_or(page.issues.len() as u64);
    match matches {
        0 => Ok(None),
        1 => page
            .issues
            .into_iter()
            .next()
            .map(|hit| Some(hit.id))
            .ok_or_else(|| SyncError::MalformedResponse {
                operation: OP,
                reason: "total is 1 but no issues were returned".to_string(),
            }),
        n => {
            warn!(
                project = %project,
                external_id = %external_id,
                matches = n,
                "multiple tickets mirror one GitHub issue"
            );
            Err(SyncError::LookupAmbiguity {
                project: project.clone(),
                external_id: external_id.clone(),
                matches: n,
            })
        }
    }
}
