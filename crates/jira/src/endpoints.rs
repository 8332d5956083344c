//! Jira REST endpoint catalog.
//!
//! Each remote capability is addressed by endpoint name. The catalog maps names
//! to an HTTP method, a path template with `{placeholder}` segments, and extra
//! headers. The built-in catalog targets Jira Cloud REST API v3; an API
//! definition file can replace it (see [`crate::ApiDefinition`]).

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Deserialize;

use crate::error::{JiraError, JiraResult};

/// Fetch one project.
pub const GET_PROJECT: &str = "get_project";
/// List a project's creatable issue types.
pub const GET_ISSUE_TYPES: &str = "get_metadata_issuetypes";
/// Fetch the create-field schema of one issue type.
pub const GET_ISSUE_TYPE_SCHEMA: &str = "get_metadata_issuetype";
/// JQL search.
pub const SEARCH: &str = "search_for_issues_using_JQL";
/// Create an issue.
pub const CREATE_ISSUE: &str = "open_issue";
/// Delete an issue.
pub const DELETE_ISSUE: &str = "delete_issue";
/// Fetch one issue.
pub const GET_ISSUE: &str = "get_issue";

/// Every endpoint the adapter calls. A catalog missing any of these is
/// rejected at start-up.
pub const REQUIRED_ENDPOINTS: [&str; 7] = [
    GET_PROJECT,
    GET_ISSUE_TYPES,
    GET_ISSUE_TYPE_SCHEMA,
    SEARCH,
    CREATE_ISSUE,
    DELETE_ISSUE,
    GET_ISSUE,
];

/// An endpoint as written in an API definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointDefinition {
    /// Endpoint name.
    pub name: String,
    /// HTTP method (`GET`, `POST`, ...).
    pub method: String,
    /// Path template relative to the base URL.
    pub path: String,
    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// A resolved endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Endpoint name.
    pub name: String,
    /// HTTP method.
    pub method: Method,
    /// Path template, e.g. `/rest/api/3/issue/{issueIdOrKey}`.
    pub path: String,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
}

impl Endpoint {
    fn new(name: &str, method: Method, path: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            name: name.to_string(),
            method,
            path: path.to_string(),
            headers,
        }
    }

    /// Substitutes `{placeholder}` segments in the path template.
    ///
    /// Values must be single path segments: no separators, no percent
    /// escapes, and not a `.` or `..` dot segment. Placeholders left unfilled
    /// are an error.
    pub fn render_path(&self, params: &[(&str, &str)]) -> Result<String, String> {
        let mut path = self.path.clone();
        for (name, value) in params {
            if !is_path_segment(value) {
                return Err(format!("invalid value {value:?} for path parameter {name}"));
            }
            path = path.replace(&format!("{{{name}}}"), value);
        }
        if let Some(start) = path.find('{') {
            return Err(format!("unfilled path parameter in {}", &path[start..]));
        }
        Ok(path)
    }
}

// The URL parser resolves dot segments (including `%2e`) and treats `\` as
// `/` for http(s), so any of these would move the request to another path.
fn is_path_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '?', '#', '%'])
}

impl TryFrom<EndpointDefinition> for Endpoint {
    type Error = JiraError;

    fn try_from(def: EndpointDefinition) -> JiraResult<Self> {
        let method = Method::from_bytes(def.method.to_ascii_uppercase().as_bytes()).map_err(|_| {
            JiraError::Configuration(format!(
                "endpoint '{}' has invalid method '{}'",
                def.name, def.method
            ))
        })?;
        Ok(Self {
            name: def.name,
            method,
            path: def.path,
            headers: def.headers,
        })
    }
}

/// Endpoints by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCatalog {
    endpoints: BTreeMap<String, Endpoint>,
}

impl Default for EndpointCatalog {
    fn default() -> Self {
        Self::jira_cloud()
    }
}

impl EndpointCatalog {
    /// The built-in Jira Cloud REST API v3 catalog.
    pub fn jira_cloud() -> Self {
        let mut create = Endpoint::new(CREATE_ISSUE, Method::POST, "/rest/api/3/issue");
        create
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());

        Self::from_endpoints([
            Endpoint::new(GET_PROJECT, Method::GET, "/rest/api/3/project/{projectIdOrKey}"),
            Endpoint::new(
                GET_ISSUE_TYPES,
                Method::GET,
                "/rest/api/3/issue/createmeta/{projectIdOrKey}/issuetypes",
            ),
            Endpoint::new(
                GET_ISSUE_TYPE_SCHEMA,
                Method::GET,
                "/rest/api/3/issue/createmeta/{projectIdOrKey}/issuetypes/{issueTypeId}",
            ),
            Endpoint::new(SEARCH, Method::GET, "/rest/api/3/search"),
            create,
            Endpoint::new(DELETE_ISSUE, Method::DELETE, "/rest/api/3/issue/{issueIdOrKey}"),
            Endpoint::new(GET_ISSUE, Method::GET, "/rest/api/3/issue/{issueIdOrKey}"),
        ])
    }

    /// Builds a catalog from endpoints; later duplicates replace earlier ones.
    pub fn from_endpoints(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        Self {
            endpoints: endpoints
                .into_iter()
                .map(|e| (e.name.clone(), e))
                .collect(),
        }
    }

    /// Builds a catalog from definition-file entries and checks it is complete.
    pub fn from_definitions(defs: Vec<EndpointDefinition>) -> JiraResult<Self> {
        let endpoints = defs
            .into_iter()
            .map(Endpoint::try_from)
            .collect::<JiraResult<Vec<_>>>()?;
        let catalog = Self::from_endpoints(endpoints);
        catalog.validate()?;
        Ok(catalog)
    }

    /// Fails if any endpoint in [`REQUIRED_ENDPOINTS`] is missing.
    pub fn validate(&self) -> JiraResult<()> {
        let missing: Vec<&str> = REQUIRED_ENDPOINTS
            .iter()
            .copied()
            .filter(|name| !self.endpoints.contains_key(*name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(JiraError::Configuration(format!(
                "endpoint definitions missing: {}",
                missing.join(", ")
            )))
        }
    }

    /// Returns the endpoint with `name`.
    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_catalog_is_complete() {
        let catalog = EndpointCatalog::jira_cloud();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.get(DELETE_ISSUE).unwrap().method, Method::DELETE);
        assert_eq!(
            catalog.get(CREATE_ISSUE).unwrap().headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn render_fills_placeholders() {
        let catalog = EndpointCatalog::jira_cloud();
        let path = catalog
            .get(GET_ISSUE_TYPE_SCHEMA)
            .unwrap()
            .render_path(&[("projectIdOrKey", "CD"), ("issueTypeId", "10004")])
            .unwrap();
        assert_eq!(path, "/rest/api/3/issue/createmeta/CD/issuetypes/10004");
    }

    #[test]
    fn render_rejects_missing_and_unsafe_values() {
        let endpoint = EndpointCatalog::jira_cloud().get(GET_ISSUE).cloned().unwrap();
        assert!(endpoint.render_path(&[]).unwrap_err().contains("{issueIdOrKey}"));
        assert!(endpoint.render_path(&[("issueIdOrKey", "../x")]).is_err());
        assert!(endpoint.render_path(&[("issueIdOrKey", "")]).is_err());
        for value in ["..", ".", "%2e%2e", "..\\admin", "CD-1?x=1", "CD-1#x"] {
            assert!(
                endpoint.render_path(&[("issueIdOrKey", value)]).is_err(),
                "{value:?} should be rejected"
            );
        }
        assert_eq!(
            endpoint.render_path(&[("issueIdOrKey", "CD-1.2")]).unwrap(),
            "/rest/api/3/issue/CD-1.2"
        );
    }

    #[test]
    fn incomplete_definitions_are_rejected() {
        let defs = vec![EndpointDefinition {
            name: GET_PROJECT.into(),
            method: "get".into(),
            path: "/rest/api/3/project/{projectIdOrKey}".into(),
            headers: BTreeMap::new(),
        }];
        let err = EndpointCatalog::from_definitions(defs).unwrap_err();
        assert!(err.to_string().contains("open_issue"));
    }

    #[test]
    fn invalid_method_is_rejected() {
        let def = EndpointDefinition {
            name: GET_PROJECT.into(),
            method: "GE T".into(),
            path: "/x".into(),
            headers: BTreeMap::new(),
        };
        assert!(Endpoint::try_from(def).is_err());
    }
}
