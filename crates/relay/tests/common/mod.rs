//! In-memory ticket tracker used to drive the engine end to end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use relay::{
    description, ApiResponse, IssueTypeId, ProjectKey, TicketClient, TicketClientError, TicketId,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct StoredTicket {
    pub id: String,
    pub key: String,
    pub fields: Value,
    pub description: String,
}

enum Injected {
    Response(u16, Value),
    Transport(String),
}

#[derive(Default)]
struct State {
    tickets: Vec<StoredTicket>,
    next_id: u64,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, Injected>,
    fields: Vec<Value>,
}

/// A single-project tracker ("CD", lead "lead-1") with Bug/Task/Story types.
pub struct FakeTracker {
    state: Mutex<State>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 10_000,
                fields: vec![
                    json!({"fieldId": "project", "required": true, "name": "Project"}),
                    json!({"fieldId": "issuetype", "required": true, "name": "Issue Type"}),
                    json!({"fieldId": "summary", "required": true, "name": "Summary"}),
                    json!({"fieldId": "reporter", "required": true, "name": "Reporter"}),
                    json!({"fieldId": "labels", "required": false, "name": "Labels"}),
                ],
                ..State::default()
            }),
        }
    }

    /// Makes every call to `operation` answer with `status` and `body`.
    pub fn fail(&self, operation: &'static str, status: u16, body: Value) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation, Injected::Response(status, body));
    }

    /// Makes every call to `operation` fail before reaching the tracker.
    pub fn fail_transport(&self, operation: &'static str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation, Injected::Transport(message.to_string()));
    }

    /// Adds a required field the engine has no binding for.
    pub fn require_field(&self, field_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fields
            .push(json!({"fieldId": field_id, "required": true, "name": field_id}));
    }

    /// Stores a ticket mirroring `external_id` without going through the engine.
    pub fn seed_ticket(&self, external_id: &str) -> String {
        let payload = json!({
            "fields": {
                "summary": "seeded",
                "description": description::to_document(&format!("githubIssueId: {external_id}\n")),
            }
        });
        self.store(&payload)
    }

    pub fn tickets(&self) -> Vec<StoredTicket> {
        self.state.lock().unwrap().tickets.clone()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn store(&self, payload: &Value) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id.to_string();
        let key = format!("CD-{}", state.tickets.len() + 1);
        state.tickets.push(StoredTicket {
            id: id.clone(),
            key,
            fields: payload["fields"].clone(),
            description: description::plain_text(&payload["fields"]["description"]),
        });
        id
    }

    /// Records the call and returns the injected failure, if any.
    fn enter(&self, operation: &'static str) -> Option<Result<ApiResponse, TicketClientError>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        state.failures.get(operation).map(|injected| match injected {
            Injected::Response(status, body) => Ok(ApiResponse::new(*status, body.clone())),
            Injected::Transport(message) => Err(TicketClientError::Transport {
                operation: operation.to_string(),
                message: message.clone(),
            }),
        })
    }
}

/// Renders a stored ticket the way the tracker's issue resource does: users
/// are `accountId` objects and the issue type carries its name.
fn issue_resource(ticket: &StoredTicket) -> Value {
    let fields = &ticket.fields;
    let reporter = fields["reporter"]["id"].as_str().unwrap_or("lead-1");
    let issue_type = match fields["issuetype"]["id"].as_str() {
        Some(id) => json!({"id": id, "name": "Bug"}),
        None => Value::Null,
    };
    json!({
        "id": ticket.id,
        "key": ticket.key,
        "self": format!("https://tracker.test/rest/api/3/issue/{}", ticket.id),
        "fields": {
            "summary": fields["summary"],
            "description": fields["description"],
            "project": {"id": "10002", "key": "CD", "name": "Python project"},
            "issuetype": issue_type,
            "reporter": {"accountId": reporter, "displayName": "Project Lead"},
            "status": {"name": "To Do"}
        }
    })
}

fn searched_id(query: &str) -> Option<String> {
    let rest = query.split("githubIssueId: ").nth(1)?;
    Some(rest.split('\\').next()?.to_string())
}

#[async_trait]
impl TicketClient for FakeTracker {
    async fn get_project(&self, key: &ProjectKey) -> Result<ApiResponse, TicketClientError> {
        if let Some(injected) = self.enter("get_project") {
            return injected;
        }
        if key.as_str() != "CD" {
            return Ok(ApiResponse::new(
                404,
                json!({"errorMessages": ["No project could be found with key 'X'."]}),
            ));
        }
        Ok(ApiResponse::new(
            200,
            json!({
                "id": "10002",
                "key": "CD",
                "name": "Python project",
                "description": "",
                "projectTypeKey": "software",
                "lead": {"accountId": "lead-1", "displayName": "Project Lead"}
            }),
        ))
    }

    async fn get_issue_types(
        &self,
        _project: &ProjectKey,
    ) -> Result<ApiResponse, TicketClientError> {
        if let Some(injected) = self.enter("get_metadata_issuetypes") {
            return injected;
        }
        Ok(ApiResponse::new(
            200,
            json!({"issueTypes": [
                {"id": "10001", "name": "Task"},
                {"id": "10004", "name": "Bug"},
                {"id": "10007", "name": "Story"}
            ]}),
        ))
    }

    async fn get_issue_type_schema(
        &self,
        _project: &ProjectKey,
        _issue_type: &IssueTypeId,
    ) -> Result<ApiResponse, TicketClientError> {
        if let Some(injected) = self.enter("get_metadata_issuetype") {
            return injected;
        }
        let fields = self.state.lock().unwrap().fields.clone();
        Ok(ApiResponse::new(200, json!({ "fields": fields })))
    }

    async fn search_by_query(&self, query: &str) -> Result<ApiResponse, TicketClientError> {
        if let Some(injected) = self.enter("search_for_issues_using_JQL") {
            return injected;
        }
        let line = format!("githubIssueId: {}\n", searched_id(query).unwrap_or_default());
        let hits: Vec<Value> = self
            .tickets()
            .into_iter()
            .filter(|t| t.description.contains(&line))
            .map(|t| json!({"id": t.id, "key": t.key}))
            .collect();
        Ok(ApiResponse::new(
            200,
            json!({"startAt": 0, "total": hits.len(), "issues": hits}),
        ))
    }

    async fn create_ticket(&self, payload: &Value) -> Result<ApiResponse, TicketClientError> {
        if let Some(injected) = self.enter("open_issue") {
            return injected;
        }
        let id = self.store(payload);
        let key = self.tickets().last().map(|t| t.key.clone()).unwrap_or_default();
        Ok(ApiResponse::new(
            201,
            json!({"id": id, "key": key, "self": format!("https://tracker.test/rest/api/3/issue/{id}")}),
        ))
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<ApiResponse, TicketClientError> {
        if let Some(injected) = self.enter("delete_issue") {
            return injected;
        }
        let mut state = self.state.lock().unwrap();
        let before = state.tickets.len();
        state.tickets.retain(|t| t.id != id.as_str());
        if state.tickets.len() == before {
            return Ok(ApiResponse::new(404, json!({"errorMessages": ["Issue does not exist"]})));
        }
        Ok(ApiResponse::new(204, Value::Null))
    }

    async fn get_ticket(&self, id_or_key: &str) -> Result<ApiResponse, TicketClientError> {
        if let Some(injected) = self.enter("get_issue") {
            return injected;
        }
        let ticket = self
            .tickets()
            .into_iter()
            .find(|t| t.id == id_or_key || t.key == id_or_key);
        Ok(match ticket {
            Some(t) => ApiResponse::new(200, issue_resource(&t)),
            None => ApiResponse::new(404, json!({"errorMessages": ["Issue does not exist"]})),
        })
    }
}
