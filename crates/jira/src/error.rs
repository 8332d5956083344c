//! Error types for the Jira adapter.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring the Jira adapter.
///
/// All of these are fatal at start-up: the relay never serves requests with an
/// incomplete configuration.
#[derive(Debug, Error)]
pub enum JiraError {
    /// A required setting is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A definition or catalog file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A definition or catalog file is not valid JSON of the expected shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for Jira adapter configuration.
pub type JiraResult<T> = std::result::Result<T, JiraError>;

/// Reads and parses a JSON file.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> JiraResult<T> {
    let text = std::fs::read_to_string(path).map_err(|source| JiraError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| JiraError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
