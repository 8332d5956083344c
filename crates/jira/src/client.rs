//! HTTP client for the Jira Cloud REST API.

use async_trait::async_trait;
use relay::{ApiResponse, IssueTypeId, ProjectKey, TicketClient, TicketClientError, TicketId};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::JiraConfig;
use crate::endpoints::{self, EndpointCatalog};
use crate::error::JiraResult;

/// [`TicketClient`] over the Jira REST API with basic auth.
///
/// Every request is a single attempt bounded by the configured timeout.
#[derive(Clone)]
pub struct JiraClient {
    http: Client,
    base_url: String,
    user: String,
    token: SecretString,
    endpoints: EndpointCatalog,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// One outbound request, before endpoint resolution.
struct Call<'a> {
    endpoint: &'static str,
    params: &'a [(&'a str, &'a str)],
    query: &'a [(&'a str, &'a str)],
    body: Option<&'a Value>,
}

impl<'a> Call<'a> {
    fn to(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            params: &[],
            query: &[],
            body: None,
        }
    }

    fn params(mut self, params: &'a [(&'a str, &'a str)]) -> Self {
        self.params = params;
        self
    }

    fn query(mut self, query: &'a [(&'a str, &'a str)]) -> Self {
        self.query = query;
        self
    }

    fn body(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl JiraClient {
    /// Creates a client from a validated configuration.
    pub fn new(config: &JiraConfig) -> JiraResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("issue-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            user: config.user.clone(),
            token: config.token.clone(),
            endpoints: config.endpoints.clone(),
        })
    }

    /// Returns the site root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip_all, fields(endpoint = call.endpoint))]
    async fn send(&self, call: Call<'_>) -> Result<ApiResponse, TicketClientError> {
        let operation = call.endpoint;
        let invalid = |message: String| TicketClientError::InvalidRequest {
            operation: operation.to_string(),
            message,
        };
        let transport = |err: reqwest::Error| TicketClientError::Transport {
            operation: operation.to_string(),
            message: err.to_string(),
        };

        let endpoint = self
            .endpoints
            .get(operation)
            .ok_or_else(|| invalid("endpoint is not defined".to_string()))?;
        let path = endpoint.render_path(call.params).map_err(invalid)?;
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .request(endpoint.method.clone(), &url)
            .basic_auth(&self.user, Some(self.token.expose_secret()));
        for (name, value) in &endpoint.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !call.query.is_empty() {
            request = request.query(call.query);
        }
        if let Some(body) = call.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport)?;
        debug!(method = %endpoint.method, %url, status, "ticket API call");

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(ApiResponse::new(status, body))
    }
}

#[async_trait]
impl TicketClient for JiraClient {
    async fn get_project(&self, key: &ProjectKey) -> Result<ApiResponse, TicketClientError> {
        self.send(Call::to(endpoints::GET_PROJECT).params(&[("projectIdOrKey", key.as_str())]))
            .await
    }

    async fn get_issue_types(
        &self,
        project: &ProjectKey,
    ) -> Result<ApiResponse, TicketClientError> {
        self.send(
            Call::to(endpoints::GET_ISSUE_TYPES).params(&[("projectIdOrKey", project.as_str())]),
        )
        .await
    }

    async fn get_issue_type_schema(
        &self,
        project: &ProjectKey,
        issue_type: &IssueTypeId,
    ) -> Result<ApiResponse, TicketClientError> {
        self.send(Call::to(endpoints::GET_ISSUE_TYPE_SCHEMA).params(&[
            ("projectIdOrKey", project.as_str()),
            ("issueTypeId", issue_type.as_str()),
        ]))
        .await
    }

    async fn search_by_query(&self, query: &str) -> Result<ApiResponse, TicketClientError> {
        self.send(Call::to(endpoints::SEARCH).query(&[("jql", query)]))
            .await
    }

    async fn create_ticket(&self, payload: &Value) -> Result<ApiResponse, TicketClientError> {
        self.send(Call::to(endpoints::CREATE_ISSUE).body(payload))
            .await
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<ApiResponse, TicketClientError> {
        self.send(Call::to(endpoints::DELETE_ISSUE).params(&[("issueIdOrKey", id.as_str())]))
            .await
    }

    async fn get_ticket(&self, id_or_key: &str) -> Result<ApiResponse, TicketClientError> {
        self.send(Call::to(endpoints::GET_ISSUE).params(&[("issueIdOrKey", id_or_key)]))
            .await
    }
}
