//! issue-relay Jira infrastructure adapter.
//!
//! Implements the [`relay::TicketClient`] trait for the Jira Cloud REST API
//! (v3) using `reqwest`, authenticating every request with basic auth (account
//! e-mail + API token).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Endpoint layout, URL construction, authentication,
//! timeouts, and body decoding live here. The [`relay`] crate sees only
//! [`relay::TicketClient`] and [`relay::ApiResponse`]; it judges statuses and
//! bodies itself.
//!
//! ## Configuration
//!
//! - [`JiraConfig`]: base URL, credentials, endpoint catalog, timeout. Built
//!   once by the caller and passed by reference to [`JiraClient::new`].
//! - [`ApiDefinition`]: optional JSON file replacing the built-in endpoint
//!   catalog and supplying the base URL.
//! - [`ProjectCatalog`]: optional JSON file of projects, used instead of
//!   fetching the target project from Jira.

pub mod catalog;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

pub use catalog::ProjectCatalog;
pub use client::JiraClient;
pub use config::{ApiDefinition, JiraConfig, DEFAULT_REQUEST_TIMEOUT};
pub use endpoints::{Endpoint, EndpointCatalog};
pub use error::{JiraError, JiraResult};
