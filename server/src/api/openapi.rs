//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{domains, health, sessions};
use crate::domain::{
    Breakdown, Domain, FieldKind, FilterOptions, OptionList, OptionSource, Run, RunResult,
    RunStatus, TableInfo, Trend, TrendSeries,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DataPortal API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Read-only analytics over sales, procurement and finance marts"
    ),
    tags(
        (name = "health", description = "Service and database status"),
        (name = "domains", description = "Domain catalog, filter options and SQL preview"),
        (name = "sessions", description = "Dashboard sessions"),
        (name = "runs", description = "Run execution and history")
    ),
    paths(
        // Health
        health::health,
        health::database_status,
        // Domains
        domains::list_domains,
        domains::get_domain,
        domains::get_filter_options,
        domains::preview,
        // Sessions
        sessions::create_session,
        sessions::get_session,
        sessions::end_session,
        sessions::set_domain,
        // Runs
        sessions::create_run,
        sessions::list_runs,
        sessions::get_run,
        sessions::select_run,
        sessions::clear_runs,
    ),
    components(schemas(
        // Health
        health::HealthResponse,
        health::DatabaseStatusDto,
        // Domains
        Domain,
        FieldKind,
        TableInfo,
        FilterOptions,
        OptionList,
        OptionSource,
        domains::types::DomainSummaryDto,
        domains::types::FilterFieldDto,
        domains::types::PreviewRequest,
        domains::types::PreviewResponse,
        // Sessions
        sessions::types::SessionDto,
        sessions::types::SetDomainRequest,
        // Runs
        Run,
        RunStatus,
        RunResult,
        Trend,
        TrendSeries,
        Breakdown,
        sessions::types::RunRequest,
        sessions::types::ListRunsQuery,
        sessions::types::RunListResponse,
        sessions::types::ClearRunsResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>DataPortal API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
