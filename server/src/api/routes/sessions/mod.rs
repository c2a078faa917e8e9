//! Session and run endpoints
//!
//! Every route except session creation acts on the session named by the
//! `x-session-id` header. The session stays locked for the whole run, so a
//! session executes one run at a time while other sessions proceed.

pub mod types;

use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use types::{
    ClearRunsResponse, ListRunsQuery, RunListResponse, RunRequest, SessionDto, SetDomainRequest,
};

use crate::api::extractors::{CurrentSession, RunPath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::core::config::{KpiFailurePolicy, StaticFilterOptions};
use crate::data::FactService;
use crate::domain::inspect;
use crate::domain::{Domain, FilterSet, Run, RunError, RunStatus, SessionRegistry};

/// Shared state for Sessions API endpoints
#[derive(Clone)]
pub struct SessionsApiState {
    pub facts: Arc<FactService>,
    pub sessions: SessionRegistry,
    pub static_options: Arc<StaticFilterOptions>,
    pub kpi_failure_policy: KpiFailurePolicy,
}

impl FromRef<SessionsApiState> for SessionRegistry {
    fn from_ref(state: &SessionsApiState) -> Self {
        state.sessions.clone()
    }
}

/// Build Sessions API routes
pub fn routes(state: SessionsApiState) -> Router<()> {
    Router::new()
        .route("/", post(create_session))
        .route("/current", get(get_session).delete(end_session))
        .route("/current/domain", put(set_domain))
        .route(
            "/current/runs",
            post(create_run).get(list_runs).delete(clear_runs),
        )
        .route("/current/runs/{run_id}", get(get_run))
        .route("/current/runs/{run_id}/current", put(select_run))
        .with_state(state)
}

/// Start a new session
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 201, description = "Session created", body = SessionDto)
    )
)]
pub async fn create_session(
    State(state): State<SessionsApiState>,
) -> (StatusCode, Json<SessionDto>) {
    let (_, session) = state.sessions.create().await;
    let session = session.lock().await;
    (StatusCode::CREATED, Json(SessionDto::from(&*session)))
}

/// Get the current session
#[utoipa::path(
    get,
    path = "/api/v1/sessions/current",
    tag = "sessions",
    params(("x-session-id" = String, Header, description = "Session ID")),
    responses(
        (status = 200, description = "Session details", body = SessionDto),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn get_session(current: CurrentSession) -> Json<SessionDto> {
    let session = current.session.lock().await;
    Json(SessionDto::from(&*session))
}

/// End the current session and drop its run history
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/current",
    tag = "sessions",
    params(("x-session-id" = String, Header, description = "Session ID")),
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn end_session(
    State(state): State<SessionsApiState>,
    current: CurrentSession,
) -> StatusCode {
    state.sessions.end(current.id).await;
    StatusCode::NO_CONTENT
}

/// Switch the session's current domain
#[utoipa::path(
    put,
    path = "/api/v1/sessions/current/domain",
    tag = "sessions",
    params(("x-session-id" = String, Header, description = "Session ID")),
    request_body = SetDomainRequest,
    responses(
        (status = 200, description = "Domain switched", body = SessionDto),
        (status = 400, description = "Unknown domain")
    )
)]
pub async fn set_domain(
    current: CurrentSession,
    ValidatedJson(req): ValidatedJson<SetDomainRequest>,
) -> Result<Json<SessionDto>, ApiError> {
    let domain = Domain::parse(&req.domain)?;
    let mut session = current.session.lock().await;
    session.set_current_domain(domain);
    Ok(Json(SessionDto::from(&*session)))
}

/// Execute a run and record it in the session history
///
/// Returns 201 with the completed run, or 502 with the failed run when a
/// query could not be executed.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/current/runs",
    tag = "runs",
    params(("x-session-id" = String, Header, description = "Session ID")),
    request_body = RunRequest,
    responses(
        (status = 201, description = "Run completed", body = Run),
        (status = 400, description = "Unknown domain or invalid filters"),
        (status = 502, description = "Run failed", body = Run)
    )
)]
pub async fn create_run(
    State(state): State<SessionsApiState>,
    current: CurrentSession,
    ValidatedJson(req): ValidatedJson<RunRequest>,
) -> Result<(StatusCode, Json<Run>), ApiError> {
    let mut session = current.session.lock().await;
    let domain = match req.domain.as_deref() {
        Some(tag) => Domain::parse(tag)?,
        None => session.current_domain(),
    };
    let filters = FilterSet::from_json(domain, &req.filters)?;
    let repo = state.facts.repository();

    if filters.has_selections() {
        let options =
            inspect::filter_options(repo.as_ref(), domain, &state.static_options).await;
        filters.check_options(&options)?;
    }

    let run = session
        .execute_run(repo.as_ref(), filters, state.kpi_failure_policy)
        .await?;
    let status = match run.status() {
        RunStatus::Completed => StatusCode::CREATED,
        _ => StatusCode::BAD_GATEWAY,
    };
    Ok((status, Json(run.clone())))
}

/// Run history of the current session
#[utoipa::path(
    get,
    path = "/api/v1/sessions/current/runs",
    tag = "runs",
    params(
        ("x-session-id" = String, Header, description = "Session ID"),
        ("domain" = Option<String>, Query, description = "Restrict to one domain"),
        ("status" = Option<String>, Query, description = "pending, running, completed or failed")
    ),
    responses(
        (status = 200, description = "Runs, newest first", body = RunListResponse),
        (status = 400, description = "Invalid query")
    )
)]
pub async fn list_runs(
    current: CurrentSession,
    ValidatedQuery(query): ValidatedQuery<ListRunsQuery>,
) -> Result<Json<RunListResponse>, ApiError> {
    let domain = query.domain.as_deref().map(Domain::parse).transpose()?;
    let session = current.session.lock().await;

    let runs: Vec<Run> = session
        .runs()
        .list(domain)
        .into_iter()
        .filter(|r| query.status.as_deref().is_none_or(|s| r.status().as_str() == s))
        .cloned()
        .collect();
    let total = runs.len();
    Ok(Json(RunListResponse { runs, total }))
}

/// Get one run of the current session
#[utoipa::path(
    get,
    path = "/api/v1/sessions/current/runs/{run_id}",
    tag = "runs",
    params(
        ("x-session-id" = String, Header, description = "Session ID"),
        ("run_id" = String, Path, description = "Run ID")
    ),
    responses(
        (status = 200, description = "Run details", body = Run),
        (status = 404, description = "Run not found")
    )
)]
pub async fn get_run(
    current: CurrentSession,
    RunPath(run_id): RunPath,
) -> Result<Json<Run>, ApiError> {
    let session = current.session.lock().await;
    let run = session
        .runs()
        .get(run_id)
        .cloned()
        .ok_or(RunError::NotFound(run_id))?;
    Ok(Json(run))
}

/// Make an earlier run the current one
#[utoipa::path(
    put,
    path = "/api/v1/sessions/current/runs/{run_id}/current",
    tag = "runs",
    params(
        ("x-session-id" = String, Header, description = "Session ID"),
        ("run_id" = String, Path, description = "Run ID")
    ),
    responses(
        (status = 200, description = "Run selected", body = Run),
        (status = 404, description = "Run not found")
    )
)]
pub async fn select_run(
    current: CurrentSession,
    RunPath(run_id): RunPath,
) -> Result<Json<Run>, ApiError> {
    let mut session = current.session.lock().await;
    let run = session.set_current_run(run_id)?.clone();
    Ok(Json(run))
}

/// Drop the run history of the current session
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/current/runs",
    tag = "runs",
    params(("x-session-id" = String, Header, description = "Session ID")),
    responses(
        (status = 200, description = "History cleared", body = ClearRunsResponse)
    )
)]
pub async fn clear_runs(current: CurrentSession) -> Json<ClearRunsResponse> {
    let removed = current.session.lock().await.clear_runs();
    Json(ClearRunsResponse { removed })
}
