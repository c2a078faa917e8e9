//! Domain catalog, inspection and preview endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use types::{DomainSummaryDto, PreviewRequest, PreviewResponse};

use crate::api::extractors::{DomainPath, ValidatedJson};
use crate::api::types::ApiError;
use crate::core::config::StaticFilterOptions;
use crate::data::FactService;
use crate::domain::inspect::{self, FilterOptions, TableInfo};
use crate::domain::{Domain, FilterSet, build_where, preview_sql};

/// Shared state for Domains API endpoints
#[derive(Clone)]
pub struct DomainsApiState {
    pub facts: Arc<FactService>,
    pub static_options: Arc<StaticFilterOptions>,
}

/// Build Domains API routes
pub fn routes(facts: Arc<FactService>, static_options: Arc<StaticFilterOptions>) -> Router<()> {
    let state = DomainsApiState {
        facts,
        static_options,
    };

    Router::new()
        .route("/", get(list_domains))
        .route("/{domain}", get(get_domain))
        .route("/{domain}/filter-options", get(get_filter_options))
        .route("/{domain}/preview", post(preview))
        .with_state(state)
}

/// List the available domains
#[utoipa::path(
    get,
    path = "/api/v1/domains",
    tag = "domains",
    responses(
        (status = 200, description = "Domain catalog", body = Vec<DomainSummaryDto>)
    )
)]
pub async fn list_domains() -> Json<Vec<DomainSummaryDto>> {
    Json(Domain::all().iter().copied().map(Into::into).collect())
}

/// Describe a domain's fact table with sample rows
#[utoipa::path(
    get,
    path = "/api/v1/domains/{domain}",
    tag = "domains",
    params(("domain" = String, Path, description = "Domain tag (sales, procurement, finance)")),
    responses(
        (status = 200, description = "Table info", body = TableInfo),
        (status = 400, description = "Unknown domain")
    )
)]
pub async fn get_domain(
    State(state): State<DomainsApiState>,
    DomainPath(domain): DomainPath,
) -> Json<TableInfo> {
    let repo = state.facts.repository();
    Json(inspect::table_info(repo.as_ref(), domain).await)
}

/// Selectable filter values and data coverage for a domain
#[utoipa::path(
    get,
    path = "/api/v1/domains/{domain}/filter-options",
    tag = "domains",
    params(("domain" = String, Path, description = "Domain tag (sales, procurement, finance)")),
    responses(
        (status = 200, description = "Filter options", body = FilterOptions),
        (status = 400, description = "Unknown domain")
    )
)]
pub async fn get_filter_options(
    State(state): State<DomainsApiState>,
    DomainPath(domain): DomainPath,
) -> Json<FilterOptions> {
    let repo = state.facts.repository();
    Json(inspect::filter_options(repo.as_ref(), domain, &state.static_options).await)
}

/// Render the WHERE clause and SQL preview for a filter set
///
/// Nothing is executed; the database is not touched.
#[utoipa::path(
    post,
    path = "/api/v1/domains/{domain}/preview",
    tag = "domains",
    params(("domain" = String, Path, description = "Domain tag (sales, procurement, finance)")),
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Rendered preview", body = PreviewResponse),
        (status = 400, description = "Unknown domain or invalid filters")
    )
)]
pub async fn preview(
    DomainPath(domain): DomainPath,
    ValidatedJson(req): ValidatedJson<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let filters = FilterSet::from_json(domain, &req.filters)?;
    let clause = build_where(&filters);

    Ok(Json(PreviewResponse {
        domain,
        where_clause: clause.named(),
        binds: clause.bind_map().clone(),
        sql: preview_sql(&filters),
        summary: filters.summary(),
    }))
}
