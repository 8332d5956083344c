//! HTTP routes.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use relay::response::DEFAULT_FAILURE_STATUS;
use relay::{normalize, summarize, ProjectKey, SyncEngine, SyncError};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::payload;

/// Builds the relay router over a shared engine.
///
/// | Route | Purpose |
/// |-------|---------|
/// | `POST /issue` | GitHub `issues` webhook |
/// | `GET /projects/{key}` | Project metadata |
/// | `GET /tickets/{id_or_key}` | Ticket metadata |
/// | `GET /health` | Liveness |
pub fn router(engine: Arc<SyncEngine>) -> Router {
    Router::new()
        .route("/issue", post(receive_issue))
        .route("/projects/{key}", get(get_project))
        .route("/tickets/{id_or_key}", get(get_ticket))
        .route("/health", get(health_check))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn sync_error_response(err: &SyncError) -> Response {
    let status = status_code(err.http_status().unwrap_or(DEFAULT_FAILURE_STATUS));
    error_response(status, err.to_string())
}

async fn receive_issue(State(engine): State<Arc<SyncEngine>>, body: Bytes) -> Response {
    let event = match payload::parse(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "rejected webhook payload");
            return error_response(StatusCode::OK, err.to_string());
        }
    };

    let outcome = engine.handle(&event).await;
    info!("{}", summarize(&outcome, &event));

    let normalized = normalize(&outcome, &event);
    let status = status_code(normalized.status);
    if status == StatusCode::NO_CONTENT {
        return status.into_response();
    }
    (status, Json(normalized.body)).into_response()
}

async fn get_project(State(engine): State<Arc<SyncEngine>>, Path(key): Path<String>) -> Response {
    let Some(key) = ProjectKey::new(key) else {
        return error_response(StatusCode::BAD_REQUEST, "project key is empty");
    };
    match engine.project(&key).await {
        Ok(project) => Json(project).into_response(),
        Err(err) => sync_error_response(&err),
    }
}

async fn get_ticket(
    State(engine): State<Arc<SyncEngine>>,
    Path(id_or_key): Path<String>,
) -> Response {
    match engine.ticket(&id_or_key).await {
        Ok(ticket) => Json(ticket).into_response(),
        Err(err) => sync_error_response(&err),
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
