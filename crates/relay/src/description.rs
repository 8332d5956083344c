//! Ticket description synthesis.
//!
//! Tickets created by the relay carry a description whose first line is
//! `githubIssueId: <id>`. That line is the only link between a ticket and its
//! GitHub issue; [`crate::lookup`] searches for it.
//!
//! Descriptions are sent in Atlassian Document Format (a single paragraph
//! holding the whole text) and read back by flattening the document's text
//! nodes.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::{ExternalIssueId, GitHubIssue};

/// Marker preceding the GitHub issue id in ticket descriptions.
pub const ISSUE_ID_MARKER: &str = "githubIssueId";

/// Marker an issue author can put in the issue body to choose the ticket's
/// issue type (`githubIssueType: Story`).
pub const ISSUE_TYPE_MARKER: &str = "githubIssueType";

static ISSUE_TYPE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{ISSUE_TYPE_MARKER}\s*:\s*(.*)")).expect("issue type pattern is valid")
});

/// Returns the `githubIssueId: <id>` line (without newline) for an issue id.
pub fn issue_id_line(id: &ExternalIssueId) -> String {
    format!("{ISSUE_ID_MARKER}: {id}")
}

/// Builds the plain-text description for a ticket mirroring `issue`.
///
/// One `key: value` line each for the issue id, URL, creation time, and update
/// time, followed by the issue body when there is one. Every line, including
/// the last, ends with `\n`.
pub fn render(issue: &GitHubIssue) -> String {
    let stamp = |ts: Option<crate::Timestamp>| ts.map(|t| t.to_string()).unwrap_or_default();

    let mut text = format!(
        "{}\ngithubIssueURL: {}\ngithubCreatedAt: {}\ngithubUpdatedAt: {}\n",
        issue_id_line(&issue.id),
        issue.url,
        stamp(issue.created_at),
        stamp(issue.updated_at),
    );
    if let Some(body) = &issue.body {
        text.push_str(body);
        text.push('\n');
    }
    text
}

/// Wraps plain text in a one-paragraph Atlassian Document Format document.
pub fn to_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": text}
                ]
            }
        ]
    })
}

/// Flattens a description back to plain text.
///
/// Accepts an ADF document or a plain string. Block nodes are separated by
/// newlines; `hardBreak` nodes become newlines.
pub fn plain_text(description: &Value) -> String {
    let mut out = String::new();
    collect_text(description, &mut out);
    out
}

fn collect_text(node: &Value, out: &mut String) {
    match node {
        Value::String(s) => out.push_str(s),
        Value::Object(map) => {
            match map.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(text) = map.get("text").and_then(Value::as_str) {
                        out.push_str(text);
                    }
                    return;
                }
                Some("hardBreak") => {
                    out.push('\n');
                    return;
                }
                _ => {}
            }
            if let Some(children) = map.get("content").and_then(Value::as_array) {
                for child in children {
                    let is_block = child
                        .get("type")
                        .and_then(Value::as_str)
                        .is_some_and(|t| t != "text" && t != "hardBreak");
                    if is_block && !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    collect_text(child, out);
                }
            }
        }
        _ => {}
    }
}

/// Returns the issue type requested by a `githubIssueType: <name>` line in
/// the issue body, if any.
///
/// The first matching line wins. The captured name is trimmed; an empty name
/// counts as no request.
pub fn requested_issue_type(body: Option<&str>) -> Option<String> {
    let captures = ISSUE_TYPE_HINT.captures(body?)?;
    let name = captures.get(1)?.as_str().trim();
    (!name.is_empty()).then(|| name.to_string())
}
