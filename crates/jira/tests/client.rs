use std::io::Write;
use std::sync::Arc;

use jira::{ApiDefinition, JiraClient, JiraConfig};
use relay::{
    GitHubIssue, IssueTypeId, ProjectKey, ProjectSource, SyncEngine, SyncOutcome, SyncSettings,
    TicketClient, TicketClientError, TicketId, WebhookEvent,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH: &str = "Basic Ym90QGV4YW1wbGUuY29tOnMzY3JldA==";

fn client(server: &MockServer) -> JiraClient {
    JiraClient::new(&JiraConfig::new(server.uri(), "bot@example.com", "s3cret")).unwrap()
}

fn key(k: &str) -> ProjectKey {
    ProjectKey::new(k).unwrap()
}

#[tokio::test]
async fn get_project_uses_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/project/CD"))
        .and(header("authorization", AUTH))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "10002",
            "key": "CD",
            "lead": {"accountId": "lead-1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).get_project(&key("CD")).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["id"], json!("10002"));
}

#[tokio::test]
async fn metadata_paths_include_project_and_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/createmeta/CD/issuetypes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"issueTypes": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/createmeta/CD/issuetypes/10004"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let types = client.get_issue_types(&key("CD")).await.unwrap();
    let schema = client
        .get_issue_type_schema(&key("CD"), &IssueTypeId::new("10004").unwrap())
        .await
        .unwrap();

    assert_eq!(types.body, json!({"issueTypes": []}));
    assert_eq!(schema.body, json!({"fields": []}));
}

#[tokio::test]
async fn search_passes_jql_as_query_parameter() {
    let server = MockServer::start().await;
    let jql = r#"project = "CD" AND description ~ "\"githubIssueId: 42\"""#;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/search"))
        .and(query_param("jql", jql))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "issues": []})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).search_by_query(jql).await.unwrap();

    assert_eq!(response.body["total"], json!(0));
}

#[tokio::test]
async fn create_posts_payload() {
    let server = MockServer::start().await;
    let payload = json!({"fields": {"summary": "Fix bug"}});
    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue"))
        .and(header("content-type", "application/json"))
        .and(body_json(&payload))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "10042", "key": "CD-7"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).create_ticket(&payload).await.unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body["key"], json!("CD-7"));
}

#[tokio::test]
async fn delete_with_empty_body_yields_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/api/3/issue/10042"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .delete_ticket(&TicketId::new("10042").unwrap())
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert_eq!(response.body, Value::Null);
}

#[tokio::test]
async fn error_statuses_are_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/CD-404"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"errorMessages": ["Issue does not exist"]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/CD-502"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = client(&server);
    let missing = client.get_ticket("CD-404").await.unwrap();
    let gateway = client.get_ticket("CD-502").await.unwrap();

    assert_eq!(missing.status, 404);
    assert_eq!(missing.body["errorMessages"][0], json!("Issue does not exist"));
    assert_eq!(gateway.status, 502);
    assert_eq!(gateway.body, json!("Bad Gateway"));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let client = JiraClient::new(&JiraConfig::new("http://127.0.0.1:1", "bot@example.com", "s3cret"))
        .unwrap();

    let err = client.get_project(&key("CD")).await.unwrap_err();

    assert!(matches!(
        err,
        TicketClientError::Transport { ref operation, .. } if operation == "get_project"
    ));
}

#[tokio::test]
async fn unsafe_path_values_are_rejected_before_sending() {
    let server = MockServer::start().await;

    let client = client(&server);

    for id_or_key in ["CD-1/../../admin", "..", ".", "%2e%2e"] {
        let err = client.get_ticket(id_or_key).await.unwrap_err();
        assert!(
            matches!(err, TicketClientError::InvalidRequest { .. }),
            "{id_or_key:?} was not rejected"
        );
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn definition_file_overrides_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jira/rest/api/2/project/CD"))
        .and(header("x-custom", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "CD"})))
        .expect(1)
        .mount(&server)
        .await;

    let endpoints: Vec<Value> = [
        ("get_project", "GET", "/rest/api/2/project/{projectIdOrKey}"),
        ("get_metadata_issuetypes", "GET", "/rest/api/2/issue/createmeta/{projectIdOrKey}/issuetypes"),
        (
            "get_metadata_issuetype",
            "GET",
            "/rest/api/2/issue/createmeta/{projectIdOrKey}/issuetypes/{issueTypeId}",
        ),
        ("search_for_issues_using_JQL", "GET", "/rest/api/2/search"),
        ("open_issue", "POST", "/rest/api/2/issue"),
        ("delete_issue", "DELETE", "/rest/api/2/issue/{issueIdOrKey}"),
        ("get_issue", "GET", "/rest/api/2/issue/{issueIdOrKey}"),
    ]
    .into_iter()
    .map(|(name, method, path)| {
        json!({"name": name, "method": method, "path": path, "headers": {"X-Custom": "yes"}})
    })
    .collect();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!({
            "id": 1,
            "name": "Jira API",
            "base_url": format!("{}/jira", server.uri()),
            "authentication": {"type": "basic"},
            "endpoints": endpoints
        })
    )
    .unwrap();

    let definition = ApiDefinition::from_file(file.path()).unwrap();
    let config = JiraConfig::from_definition(definition, "bot@example.com", "s3cret").unwrap();
    let response = JiraClient::new(&config)
        .unwrap()
        .get_project(&key("CD"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn engine_creates_ticket_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/project/CD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "10002",
            "key": "CD",
            "name": "Python project",
            "projectTypeKey": "software",
            "lead": {"accountId": "lead-1", "displayName": "Project Lead"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "issues": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/createmeta/CD/issuetypes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issueTypes": [{"id": "10004", "name": "Bug"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/createmeta/CD/issuetypes/10004"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [
                {"fieldId": "summary", "required": true, "name": "Summary"},
                {"fieldId": "project", "required": true, "name": "Project"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "10042", "key": "CD-7"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = SyncEngine::new(
        Arc::new(client(&server)),
        SyncSettings::new(ProjectSource::Remote(key("CD"))),
    );
    let event = WebhookEvent::new("labeled")
        .with_label("sync-to-jira")
        .with_issue(GitHubIssue::new("42", "Fix bug"));

    let outcome = engine.handle(&event).await;

    assert_eq!(
        outcome,
        SyncOutcome::Created {
            ticket_id: TicketId::new("10042").unwrap(),
            ticket_key: relay::TicketKey::new("CD-7").unwrap(),
        }
    );

    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let payload: Value = serde_json::from_slice(&create.body).unwrap();
    assert_eq!(payload["fields"]["summary"], json!("Fix bug"));
    assert_eq!(payload["fields"]["project"], json!({"key": "CD"}));
    assert_eq!(payload["fields"]["description"]["type"], json!("doc"));
}
