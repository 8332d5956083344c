//! Read access to remote project and ticket metadata.
//!
//! Each function performs one [`TicketClient`] call and turns the response into
//! a domain type, mapping non-success statuses and unusable bodies into
//! [`SyncError`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    description, AccountId, FieldSpec, IssueType, IssueTypeId, Project, ProjectKey, RemoteTicket,
    SyncError, TicketClient, TicketId, TicketKey,
};

fn decode<T: DeserializeOwned>(operation: &'static str, body: Value) -> Result<T, SyncError> {
    serde_json::from_value(body).map_err(|e| SyncError::MalformedResponse {
        operation,
        reason: e.to_string(),
    })
}

/// Fetches a project by key.
pub async fn fetch_project(
    client: &dyn TicketClient,
    key: &ProjectKey,
) -> Result<Project, SyncError> {
    const OP: &str = "get_project";
    let body = client.get_project(key).await?.into_success(OP)?;
    decode(OP, body)
}

/// Lists the issue types available for ticket creation in a project.
pub async fn fetch_issue_types(
    client: &dyn TicketClient,
    project: &ProjectKey,
) -> Result<Vec<IssueType>, SyncError> {
    const OP: &str = "get_metadata_issuetypes";

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct IssueTypePage {
        #[serde(alias = "values")]
        issue_types: Vec<IssueType>,
    }

    let body = client.get_issue_types(project).await?.into_success(OP)?;
    decode::<IssueTypePage>(OP, body).map(|page| page.issue_types)
}

/// Fetches the create-field schema of an issue type.
pub async fn fetch_field_schema(
    client: &dyn TicketClient,
    project: &ProjectKey,
    issue_type: &IssueTypeId,
) -> Result<Vec<FieldSpec>, SyncError> {
    const OP: &str = "get_metadata_issuetype";

    #[derive(Deserialize)]
    struct FieldPage {
        #[serde(alias = "values")]
        fields: Vec<FieldSpec>,
    }

    let body = client
        .get_issue_type_schema(project, issue_type)
        .await?
        .into_success(OP)?;
    decode::<FieldPage>(OP, body).map(|page| page.fields)
}

/// Fetches a ticket by id or key.
pub async fn fetch_ticket(
    client: &dyn TicketClient,
    id_or_key: &str,
) -> Result<RemoteTicket, SyncError> {
    const OP: &str = "get_issue";
    let body = client.get_ticket(id_or_key).await?.into_success(OP)?;
    ticket_from_body(OP, body)
}

#[derive(Deserialize)]
struct WireTicket {
    id: TicketId,
    key: TicketKey,
    #[serde(default)]
    fields: WireTicketFields,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireTicketFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Value,
    project: Option<KeyRef>,
    reporter: Option<AccountRef>,
    #[serde(rename = "issuetype")]
    issue_type: Option<IdRef>,
}

#[derive(Deserialize)]
struct KeyRef {
    key: ProjectKey,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRef {
    account_id: AccountId,
}

#[derive(Deserialize)]
struct IdRef {
    id: IssueTypeId,
}

fn ticket_from_body(operation: &'static str, body: Value) -> Result<RemoteTicket, SyncError> {
    let wire: WireTicket = decode(operation, body)?;
    Ok(RemoteTicket {
        id: wire.id,
        key: wire.key,
        project_key: wire.fields.project.map(|p| p.key),
        title: wire.fields.summary,
        description: description::plain_text(&wire.fields.description),
        reporter_id: wire.fields.reporter.map(|r| r.account_id),
        issue_type_id: wire.fields.issue_type.map(|t| t.id),
    })
}
