//! issue-relay webhook receiver.
//!
//! A thin `axum` layer in front of [`relay::SyncEngine`]:
//!
//! - [`payload`] turns a raw request body into a [`relay::WebhookEvent`], or a
//!   [`MalformedPayload`] that is answered with `200 {"error": ...}` and never
//!   reaches the engine.
//! - [`routes`] maps engine outcomes onto HTTP via [`relay::normalize`], and
//!   exposes project and ticket reads plus a health check.
//! - [`server`] binds a socket and serves until a shutdown signal.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Nothing here decides whether a ticket is created or
//! deleted; the engine does.

pub mod payload;
pub mod routes;
pub mod server;

pub use payload::{parse, MalformedPayload};
pub use routes::router;
pub use server::{serve, ServerError};
