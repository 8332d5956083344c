//! Ticket creation: maps a GitHub issue onto the required fields of the
//! project's create schema and issues a single create call.
//!
//! Required fields are filled through an explicit [`FieldBinding`] table.
//! Fields the table does not know receive [`UNMAPPED_FIELD_PLACEHOLDER`]; if
//! the remote API rejects that value the create fails and the failure is
//! propagated unchanged.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::{
    description, metadata, FieldSpec, GitHubIssue, IssueTypeId, Project, RemoteTicket, SyncError,
    TicketClient, TicketId, TicketKey,
};

/// Issue type used when the issue body does not request one.
pub const DEFAULT_ISSUE_TYPE: &str = "Bug";

/// Value sent for required fields that have no binding.
pub const UNMAPPED_FIELD_PLACEHOLDER: &str = "Place Holder";

/// How a required schema field is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldBinding {
    /// `project` → `{"key": <project key>}`
    Project,
    /// `issuetype` → `{"id": <resolved type id>}`
    IssueType,
    /// `summary` → the issue title
    Summary,
    /// `reporter` → `{"id": <project lead account id>}`
    Reporter,
    /// `description` → the synthesised description document
    Description,
    /// Any other field; receives [`UNMAPPED_FIELD_PLACEHOLDER`].
    Unmapped(String),
}

impl FieldBinding {
    /// Returns the binding for a schema field id.
    pub fn for_field(field_id: &str) -> Self {
        match field_id {
            "project" => Self::Project,
            "issuetype" => Self::IssueType,
            "summary" => Self::Summary,
            "reporter" => Self::Reporter,
            "description" => Self::Description,
            other => Self::Unmapped(other.to_string()),
        }
    }

    /// Returns the schema field id this binding fills.
    pub fn field_id(&self) -> &str {
        match self {
            Self::Project => "project",
            Self::IssueType => "issuetype",
            Self::Summary => "summary",
            Self::Reporter => "reporter",
            Self::Description => "description",
            Self::Unmapped(id) => id,
        }
    }

    fn value(&self, source: &FieldSource<'_>) -> Value {
        match self {
            Self::Project => json!({ "key": source.project.key }),
            Self::IssueType => json!({ "id": source.issue_type }),
            Self::Summary => Value::String(source.issue.title.clone()),
            Self::Reporter => json!({ "id": source.project.lead.account_id }),
            Self::Description => description::to_document(&source.description),
            Self::Unmapped(_) => Value::String(UNMAPPED_FIELD_PLACEHOLDER.to_string()),
        }
    }
}

struct FieldSource<'a> {
    issue: &'a GitHubIssue,
    project: &'a Project,
    issue_type: &'a IssueTypeId,
    description: String,
}

/// Builds the `{"fields": {...}}` create payload.
///
/// Every required field in `schema` is populated through its
/// [`FieldBinding`]. The description is always included, required or not,
/// because the idempotency lookup depends on it.
pub fn build_payload(
    issue: &GitHubIssue,
    project: &Project,
    issue_type: &IssueTypeId,
    schema: &[FieldSpec],
) -> Value {
    let source = FieldSource {
        issue,
        project,
        issue_type,
        description: description::render(issue),
    };

    let mut fields = Map::new();
    for spec in schema.iter().filter(|f| f.required) {
        let binding = FieldBinding::for_field(&spec.field_id);
        if let FieldBinding::Unmapped(id) = &binding {
            warn!(field_id = %id, field_name = %spec.name, "required field has no mapping; sending placeholder");
        }
        fields.insert(binding.field_id().to_string(), binding.value(&source));
    }
    fields.insert(
        FieldBinding::Description.field_id().to_string(),
        FieldBinding::Description.value(&source),
    );

    json!({ "fields": fields })
}

/// Resolves an issue type name to its id (exact, case-sensitive match).
async fn resolve_issue_type(
    client: &dyn TicketClient,
    project: &Project,
    name: &str,
) -> Result<IssueTypeId, SyncError> {
    metadata::fetch_issue_types(client, &project.key)
        .await?
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.id)
        .ok_or_else(|| SyncError::UnresolvedIssueType {
            name: name.to_string(),
            project: project.key.clone(),
        })
}

#[derive(Deserialize)]
struct Created {
    id: TicketId,
    key: TicketKey,
}

/// Creates the ticket mirroring `issue` in `project`.
///
/// The issue type comes from a `githubIssueType:` line in the issue body, or
/// `default_issue_type` when there is none.
pub async fn create(
    client: &dyn TicketClient,
    issue: &GitHubIssue,
    project: &Project,
    default_issue_type: &str,
) -> Result<RemoteTicket, SyncError> {
    const OP: &str = "open_issue";

    let type_name = description::requested_issue_type(issue.body.as_deref())
        .unwrap_or_else(|| default_issue_type.to_string());
    let issue_type = resolve_issue_type(client, project, &type_name).await?;
    debug!(issue_type = %type_name, issue_type_id = %issue_type, "resolved issue type");

    let schema = metadata::fetch_field_schema(client, &project.key, &issue_type).await?;
    let payload = build_payload(issue, project, &issue_type, &schema);

    let body = client.create_ticket(&payload).await?.into_success(OP)?;
    let created: Created = serde_json::from_value(body).map_err(|e| SyncError::MalformedResponse {
        operation: OP,
        reason: e.to_string(),
    })?;

    info!(ticket_id = %created.id, ticket_key = %created.key, "created ticket");
    Ok(RemoteTicket {
        id: created.id,
        key: created.key,
        project_key: Some(project.key.clone()),
        title: issue.title.clone(),
        description: description::render(issue),
        reporter_id: Some(project.lead.account_id.clone()),
        issue_type_id: Some(issue_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountId, ProjectId, ProjectKey, ProjectLead};

    fn project() -> Project {
        Project {
            id: ProjectId::new("10002").unwrap(),
            key: ProjectKey::new("CD").unwrap(),
            name: "Python project".into(),
            description: String::new(),
            project_type_key: "software".into(),
            lead: ProjectLead {
                account_id: AccountId::new("lead-1").unwrap(),
                display_name: "Project Lead".into(),
            },
        }
    }

    fn field(id: &str, required: bool) -> FieldSpec {
        FieldSpec {
            field_id: id.into(),
            required,
            name: id.into(),
        }
    }

    #[test]
    fn bindings_cover_known_fields() {
        for id in ["project", "issuetype", "summary", "reporter", "description"] {
            let binding = FieldBinding::for_field(id);
            assert!(!matches!(binding, FieldBinding::Unmapped(_)));
            assert_eq!(binding.field_id(), id);
        }
        assert_eq!(
            FieldBinding::for_field("customfield_10020"),
            FieldBinding::Unmapped("customfield_10020".into())
        );
    }

    #[test]
    fn payload_fills_required_fields() {
        let issue = GitHubIssue::new(42, "Fix bug");
        let schema = [
            field("project", true),
            field("issuetype", true),
            field("summary", true),
            field("reporter", true),
            field("customfield_10020", true),
            field("labels", false),
        ];

        let payload = build_payload(&issue, &project(), &IssueTypeId::new("10004").unwrap(), &schema);
        let fields = &payload["fields"];

        assert_eq!(fields["project"], json!({"key": "CD"}));
        assert_eq!(fields["issuetype"], json!({"id": "10004"}));
        assert_eq!(fields["summary"], json!("Fix bug"));
        assert_eq!(fields["reporter"], json!({"id": "lead-1"}));
        assert_eq!(fields["customfield_10020"], json!(UNMAPPED_FIELD_PLACEHOLDER));
        assert!(fields.get("labels").is_none());
    }

    #[test]
    fn payload_always_carries_description() {
        let issue = GitHubIssue::new(42, "Fix bug");
        let payload = build_payload(&issue, &project(), &IssueTypeId::new("10004").unwrap(), &[]);

        let text = description::plain_text(&payload["fields"]["description"]);
        assert!(text.starts_with("githubIssueId: 42\n"));
    }
}
