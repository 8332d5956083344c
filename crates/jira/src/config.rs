//! Configuration for the Jira adapter.
//!
//! A [`JiraConfig`] is built once at start-up and passed by reference to
//! [`crate::JiraClient::new`]. Credentials are supplied by the caller (the CLI
//! reads them from the environment); this crate never reads the environment
//! itself.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::endpoints::{EndpointCatalog, EndpointDefinition};
use crate::error::{read_json, JiraError, JiraResult};

/// Per-request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Jira site.
#[derive(Clone)]
pub struct JiraConfig {
    /// Site root, e.g. `https://example.atlassian.net`.
    pub base_url: String,
    /// Account e-mail used for basic auth.
    pub user: String,
    /// API token used for basic auth.
    pub token: SecretString,
    /// Endpoint layout.
    pub endpoints: EndpointCatalog,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl JiraConfig {
    /// Creates a configuration using the built-in endpoint catalog.
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: user.into(),
            token: SecretString::from(token.into()),
            endpoints: EndpointCatalog::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Creates a configuration from an API definition file's contents.
    pub fn from_definition(
        definition: ApiDefinition,
        user: impl Into<String>,
        token: impl Into<String>,
    ) -> JiraResult<Self> {
        if let Some(auth) = &definition.authentication {
            if !auth.kind.eq_ignore_ascii_case("basic") {
                return Err(JiraError::Configuration(format!(
                    "unsupported authentication type '{}' in API definition '{}'",
                    auth.kind, definition.name
                )));
            }
        }
        let endpoints = EndpointCatalog::from_definitions(definition.endpoints)?;
        Ok(Self::new(definition.base_url, user, token).with_endpoints(endpoints))
    }

    /// Replaces the endpoint catalog.
    pub fn with_endpoints(mut self, endpoints: EndpointCatalog) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> JiraResult<()> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err(JiraError::Configuration("Jira base URL is not set".into()));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(JiraError::Configuration(format!(
                "Jira base URL '{}' is not an http(s) URL",
                self.base_url
            )));
        }
        if self.user.trim().is_empty() {
            return Err(JiraError::Configuration("Jira API user is not set".into()));
        }
        if self.token.expose_secret().trim().is_empty() {
            return Err(JiraError::Configuration("Jira API token is not set".into()));
        }
        self.endpoints.validate()
    }
}

/// Authentication block of an API definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationDefinition {
    /// Authentication scheme; only `basic` is supported.
    #[serde(rename = "type")]
    pub kind: String,
}

/// An API definition file: base URL plus endpoint layout.
///
/// ```json
/// {
///   "id": 1,
///   "name": "Jira API",
///   "base_url": "https://example.atlassian.net",
///   "authentication": {"type": "basic"},
///   "endpoints": [
///     {"name": "get_project", "method": "GET",
///      "path": "/rest/api/3/project/{projectIdOrKey}",
///      "headers": {"Accept": "application/json"}}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDefinition {
    /// Definition id.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Definition name.
    #[serde(default)]
    pub name: String,
    /// Site root.
    pub base_url: String,
    /// Authentication scheme.
    #[serde(default)]
    pub authentication: Option<AuthenticationDefinition>,
    /// Endpoints.
    pub endpoints: Vec<EndpointDefinition>,
}

impl ApiDefinition {
    /// Loads a definition from a JSON file.
    pub fn from_file(path: &Path) -> JiraResult<Self> {
        let definition: Self = read_json(path)?;
        debug!(
            path = %path.display(),
            name = %definition.name,
            endpoints = definition.endpoints.len(),
            "loaded API definition"
        );
        Ok(definition)
    }
}
