//! Local project catalog.
//!
//! A JSON file `{"projects": [...]}` whose entries have the same shape as the
//! Jira project resource. When configured, the relay takes the target project
//! from here instead of fetching it on every event.

use std::path::Path;

use relay::{Project, ProjectKey};
use serde::Deserialize;

use crate::error::{read_json, JiraError, JiraResult};

/// Projects read from a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectCatalog {
    projects: Vec<Project>,
}

impl ProjectCatalog {
    /// Loads a catalog from a JSON file.
    pub fn from_file(path: &Path) -> JiraResult<Self> {
        read_json(path)
    }

    /// Returns all projects in the catalog.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Returns the project with `key`, or a configuration error if the catalog
    /// has none.
    pub fn project(&self, key: &ProjectKey) -> JiraResult<Project> {
        self.projects
            .iter()
            .find(|p| &p.key == key)
            .cloned()
            .ok_or_else(|| {
                JiraError::Configuration(format!("project {key} not found in project catalog"))
            })
    }
}
