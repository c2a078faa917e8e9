//! Path, session and validation extractors for API routes

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRef, FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::core::constants::SESSION_HEADER;
use crate::domain::{Domain, SessionRegistry, SharedSession};

/// Raw path extractor for domain routes (internal use)
#[derive(Debug, Deserialize)]
struct DomainPathRaw {
    domain: String,
}

/// Validated domain path extractor.
///
/// Parses `{domain}` into a `Domain`; unknown tags are rejected with 400.
#[derive(Debug)]
pub struct DomainPath(pub Domain);

impl<S> FromRequestParts<S> for DomainPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<DomainPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        Domain::parse(&raw.domain)
            .map(Self)
            .map_err(|e| ValidationRejection::UnknownDomain(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RunPathRaw {
    run_id: String,
}

/// Validated run path extractor (`{run_id}` must be a UUID)
#[derive(Debug)]
pub struct RunPath(pub Uuid);

impl<S> FromRequestParts<S> for RunPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<RunPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        Uuid::parse_str(&raw.run_id)
            .map(Self)
            .map_err(|_| ValidationRejection::InvalidRunId)
    }
}

/// The session named by the `x-session-id` header
pub struct CurrentSession {
    pub id: Uuid,
    pub session: SharedSession,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    SessionRegistry: FromRef<S>,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or(ValidationRejection::MissingSession)?;
        let id = header
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or(ValidationRejection::InvalidSessionId)?;

        let registry = SessionRegistry::from_ref(state);
        let session = registry
            .get(id)
            .await
            .ok_or(ValidationRejection::UnknownSession(id))?;
        Ok(Self { id, session })
    }
}

/// Validation rejection with structured error response
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Domain tag not recognized
    UnknownDomain(String),
    /// Invalid run_id format
    InvalidRunId,
    /// No session header on a session-scoped route
    MissingSession,
    /// Session header is not a UUID
    InvalidSessionId,
    /// Session expired or never existed
    UnknownSession(Uuid),
    /// Failed to parse query string
    Query(QueryRejection),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::Path(rejection) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "PATH_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::UnknownDomain(message) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "UNKNOWN_DOMAIN",
                message,
            ),
            Self::InvalidRunId => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "INVALID_RUN_ID",
                "Invalid run_id: must be a UUID".to_string(),
            ),
            Self::MissingSession => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "SESSION_REQUIRED",
                format!("Missing {} header", SESSION_HEADER),
            ),
            Self::InvalidSessionId => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "INVALID_SESSION_ID",
                format!("Invalid {} header: must be a UUID", SESSION_HEADER),
            ),
            Self::UnknownSession(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                "SESSION_NOT_FOUND",
                format!("Session not found or expired: {}", id),
            ),
            Self::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "QUERY_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "JSON_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "VALIDATION_ERROR",
                format_validation_errors(&errors),
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Query extractor with automatic validation.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

/// JSON body extractor with automatic validation.
///
/// Deserializes the body and validates it using the `validator` crate.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}
