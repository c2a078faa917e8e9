//! Session API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::types::validate_status;
use crate::domain::{Domain, Run, Session};

/// Session DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDto {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub current_domain: Domain,
    pub run_count: usize,
    pub current_run_id: Option<Uuid>,
}

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id(),
            created_at: session.created_at(),
            current_domain: session.current_domain(),
            run_count: session.runs().len(),
            current_run_id: session.current_run().map(Run::id),
        }
    }
}

/// Request body for switching the current domain
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetDomainRequest {
    #[validate(length(min = 1, max = 32, message = "domain must be 1-32 characters"))]
    pub domain: String,
}

/// Request body for executing a run
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RunRequest {
    /// Domain tag; defaults to the session's current domain
    #[validate(length(min = 1, max = 32, message = "domain must be 1-32 characters"))]
    pub domain: Option<String>,

    /// Raw filter object (null or absent means no filters)
    #[serde(default)]
    #[schema(value_type = Object)]
    pub filters: Value,
}

/// Query params for listing runs
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListRunsQuery {
    #[validate(length(min = 1, max = 32, message = "domain must be 1-32 characters"))]
    pub domain: Option<String>,

    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
}

/// Run history, newest first
#[derive(Debug, Serialize, ToSchema)]
pub struct RunListResponse {
    pub runs: Vec<Run>,
    pub total: usize,
}

/// Response for clearing the run history
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearRunsResponse {
    pub removed: usize,
}
