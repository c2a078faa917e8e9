//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::sessions::SessionsApiState;
use super::routes::{domains, health, sessions};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Serve until shutdown is triggered; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let state = SessionsApiState {
            facts: app.facts.clone(),
            sessions: app.sessions.clone(),
            static_options: Arc::new(app.config.filter_options.clone()),
            kpi_failure_policy: app.config.runs.kpi_failure_policy,
        };
        let router = build_router(state, &allowed_origins);

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "HTTP listener bound");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// Assemble the full API router
pub fn build_router(state: SessionsApiState, allowed_origins: &AllowedOrigins) -> Router {
    let domain_routes = domains::routes(state.facts.clone(), state.static_options.clone());
    let status_routes = health::routes(state.facts.clone());

    Router::new()
        .route("/api/v1/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .nest("/api/v1/database", status_routes)
        .nest("/api/v1/domains", domain_routes)
        .nest("/api/v1/sessions", sessions::routes(state))
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::core::config::{KpiFailurePolicy, SessionConfig, StaticFilterOptions};
    use crate::core::constants::SESSION_HEADER;
    use crate::data::FactService;
    use crate::data::duckdb::fixtures;
    use crate::domain::SessionRegistry;

    fn state_with(facts: FactService) -> SessionsApiState {
        SessionsApiState {
            facts: Arc::new(facts),
            sessions: SessionRegistry::new(&SessionConfig::default()),
            static_options: Arc::new(StaticFilterOptions::new()),
            kpi_failure_policy: KpiFailurePolicy::Fail,
        }
    }

    fn test_router() -> Router {
        let facts = FactService::Duckdb(fixtures::seeded_service());
        build_router(state_with(facts), &AllowedOrigins::new("127.0.0.1", 8501))
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        session: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = session {
            builder = builder.header(SESSION_HEADER, id);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn new_session(router: &Router) -> String {
        let (status, body) = send(router, Method::POST, "/api/v1/sessions", None, None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router();
        let (status, body) = send(&router, Method::GET, "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_database_status() {
        let router = test_router();
        let (status, body) =
            send(&router, Method::GET, "/api/v1/database/status", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], true);
        assert_eq!(body["backend"], "duckdb");
    }

    #[tokio::test]
    async fn test_list_and_describe_domains() {
        let router = test_router();
        let (status, body) = send(&router, Method::GET, "/api/v1/domains", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let tags: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["domain"].as_str().unwrap())
            .collect();
        assert_eq!(tags, vec!["sales", "procurement", "finance"]);

        let (status, body) =
            send(&router, Method::GET, "/api/v1/domains/finance", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["table"], "mart.gl_postings_fact");
        assert_eq!(body["degraded"], false);
        assert!(!body["sample_rows"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_domain_is_bad_request() {
        let router = test_router();
        let (status, body) = send(&router, Method::GET, "/api/v1/domains/hr", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNKNOWN_DOMAIN");
    }

    #[tokio::test]
    async fn test_filter_options() {
        let router = test_router();
        let (status, body) = send(
            &router,
            Method::GET,
            "/api/v1/domains/sales/filter-options",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "database");
        assert_eq!(body["degraded"], false);
        let regions = body["options"]
            .as_array()
            .unwrap()
            .iter()
            .find(|o| o["field"] == "regions")
            .unwrap();
        assert_eq!(regions["values"], json!(["DACH", "Nordics", "UK"]));
    }

    #[tokio::test]
    async fn test_preview() {
        let router = test_router();
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/domains/sales/preview",
            None,
            Some(json!({ "filters": { "date_from": "2025-01-01", "regions": ["DACH"] } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["where"],
            "order_date >= :date_from AND region IN :regions"
        );
        assert_eq!(body["binds"]["regions"], json!(["DACH"]));
        assert!(body["sql"].as_str().unwrap().contains("region IN ('DACH')"));
        assert_eq!(body["summary"], "From 2025-01-01 | Region: DACH");
    }

    #[tokio::test]
    async fn test_preview_rejects_invalid_filters() {
        let router = test_router();
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/domains/finance/preview",
            None,
            Some(json!({ "filters": { "regions": ["DACH"] } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTERS");
    }

    #[tokio::test]
    async fn test_session_required() {
        let router = test_router();
        let (status, body) =
            send(&router, Method::GET, "/api/v1/sessions/current", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SESSION_REQUIRED");

        let unknown = uuid::Uuid::new_v4().to_string();
        let (status, body) = send(
            &router,
            Method::GET,
            "/api/v1/sessions/current",
            Some(&unknown),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let router = test_router();
        let id = new_session(&router).await;

        let (status, body) = send(
            &router,
            Method::PUT,
            "/api/v1/sessions/current/domain",
            Some(&id),
            Some(json!({ "domain": "finance" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_domain"], "finance");

        let (status, _) =
            send(&router, Method::DELETE, "/api/v1/sessions/current", Some(&id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) =
            send(&router, Method::GET, "/api/v1/sessions/current", Some(&id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_flow() {
        let router = test_router();
        let id = new_session(&router).await;

        let (status, run) = send(
            &router,
            Method::POST,
            "/api/v1/sessions/current/runs",
            Some(&id),
            Some(json!({ "domain": "sales", "filters": { "regions": ["DACH", "UK"] } })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(run["status"], "completed");
        assert_eq!(run["result"]["kpis"]["total_revenue"], 1150.0);
        let run_id = run["id"].as_str().unwrap().to_string();

        // Domain defaults to the session's current domain (switched by the run)
        let (status, second) = send(
            &router,
            Method::POST,
            "/api/v1/sessions/current/runs",
            Some(&id),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(second["domain"], "sales");

        let (status, body) = send(
            &router,
            Method::GET,
            "/api/v1/sessions/current/runs?status=completed",
            Some(&id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);

        let uri = format!("/api/v1/sessions/current/runs/{run_id}/current");
        let (status, body) = send(&router, Method::PUT, &uri, Some(&id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], run_id.as_str());

        let (_, session) =
            send(&router, Method::GET, "/api/v1/sessions/current", Some(&id), None).await;
        assert_eq!(session["current_run_id"], run_id.as_str());
        assert_eq!(session["run_count"], 2);

        let (status, body) = send(
            &router,
            Method::DELETE,
            "/api/v1/sessions/current/runs",
            Some(&id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], 2);

        let uri = format!("/api/v1/sessions/current/runs/{run_id}");
        let (status, body) = send(&router, Method::GET, &uri, Some(&id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "RUN_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_run_rejects_unknown_option() {
        let router = test_router();
        let id = new_session(&router).await;
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/sessions/current/runs",
            Some(&id),
            Some(json!({ "domain": "sales", "filters": { "regions": ["Atlantis"] } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTERS");
    }

    #[tokio::test]
    async fn test_list_runs_rejects_bad_status() {
        let router = test_router();
        let id = new_session(&router).await;
        let (status, body) = send(
            &router,
            Method::GET,
            "/api/v1/sessions/current/runs?status=done",
            Some(&id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_failed_run_is_bad_gateway() {
        let service = fixtures::seeded_service();
        service.close().await;
        let router = build_router(
            state_with(FactService::Duckdb(service)),
            &AllowedOrigins::new("127.0.0.1", 8501),
        );
        let id = new_session(&router).await;

        let (status, run) = send(
            &router,
            Method::POST,
            "/api/v1/sessions/current/runs",
            Some(&id),
            Some(json!({ "domain": "procurement" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(run["status"], "failed");
        assert!(run.get("result").is_none());

        let (_, body) = send(
            &router,
            Method::GET,
            "/api/v1/sessions/current/runs",
            Some(&id),
            None,
        )
        .await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let router = test_router();
        let (status, body) = send(&router, Method::GET, "/api/v1/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }
}
