//! Health and database status endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::{DatabaseStatus, FactService};
use crate::domain::inspect;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Connectivity report for the fact database
#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseStatusDto {
    pub connected: bool,
    pub backend: String,
    pub database: Option<String>,
    pub server_version: Option<String>,
    pub error: Option<String>,
}

impl From<DatabaseStatus> for DatabaseStatusDto {
    fn from(status: DatabaseStatus) -> Self {
        Self {
            connected: status.connected,
            backend: status.backend.to_string(),
            database: status.database,
            server_version: status.server_version,
            error: status.error,
        }
    }
}

#[derive(Clone)]
pub struct StatusApiState {
    pub facts: Arc<FactService>,
}

/// Build database status routes
pub fn routes(facts: Arc<FactService>) -> Router<()> {
    Router::new()
        .route("/status", get(database_status))
        .with_state(StatusApiState { facts })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Database connectivity status
///
/// Always 200; a failed probe is reported with `connected = false`.
#[utoipa::path(
    get,
    path = "/api/v1/database/status",
    tag = "health",
    responses(
        (status = 200, description = "Database status", body = DatabaseStatusDto)
    )
)]
pub async fn database_status(State(state): State<StatusApiState>) -> Json<DatabaseStatusDto> {
    let repo = state.facts.repository();
    Json(inspect::database_status(repo.as_ref()).await.into())
}
