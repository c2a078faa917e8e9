//! PostgreSQL fact database service
//!
//! Connection pool over the mart schema with:
//! - Min/max pool bounds from configuration
//! - Connections validated before they are handed out
//! - Statement timeout for runaway aggregations
//!
//! The pool connects lazily, so an unreachable server surfaces as a failed
//! run or a disconnected status rather than a startup failure.

mod repository_impl;

pub use sqlx::PgPool;

use std::sync::Arc;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::log::LevelFilter;

use crate::core::config::{DatabaseConfig, DatabaseTarget};
use crate::core::constants::POSTGRES_HEALTH_CHECK_INTERVAL_SECS;
use crate::data::error::DataError;

/// PostgreSQL fact database service
///
/// Should be created once at startup and shared by all sessions.
pub struct PostgresService {
    pool: PgPool,
}

impl PostgresService {
    /// Build the connection pool from configuration
    pub fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        let DatabaseTarget::Postgres { url } = &config.target else {
            return Err(DataError::Config(
                "PostgreSQL service requires a postgres:// URL".into(),
            ));
        };

        let mut options: PgConnectOptions = url
            .parse()
            .map_err(|e| DataError::Config(format!("Invalid PostgreSQL URL: {}", e)))?;

        options = options.log_statements(LevelFilter::Trace);

        if config.statement_timeout_secs > 0 {
            options = options.options([(
                "statement_timeout",
                format!("{}s", config.statement_timeout_secs),
            )]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .test_before_acquire(true)
            .connect_lazy_with(options);

        tracing::debug!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            acquire_timeout_secs = config.acquire_timeout_secs,
            idle_timeout_secs = config.idle_timeout_secs,
            statement_timeout_secs = config.statement_timeout_secs,
            "PostgresService initialized"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("PostgreSQL pool closed");
    }

    /// Start a background health check task
    pub fn start_health_check_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let db = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(POSTGRES_HEALTH_CHECK_INTERVAL_SECS));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("PostgreSQL health check task shutting down");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if let Err(e) = sqlx::query("SELECT 1").execute(&db.pool).await {
                            tracing::warn!("PostgreSQL health check failed: {}", e);
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DatabaseTarget;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            target: DatabaseTarget::Postgres {
                url: url.to_string(),
            },
            max_connections: 2,
            min_connections: 0,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 60,
            statement_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_init_is_lazy() {
        // Nothing listens on this port; init must not try to connect
        let service = PostgresService::init(&config("postgres://u:p@127.0.0.1:1/mart")).unwrap();
        assert_eq!(service.pool().size(), 0);
    }

    #[test]
    fn test_init_rejects_duckdb_target() {
        let cfg = DatabaseConfig {
            target: DatabaseTarget::Duckdb { path: None },
            ..config("postgres://localhost/mart")
        };
        assert!(matches!(
            PostgresService::init(&cfg),
            Err(DataError::Config(_))
        ));
    }

    // Query tests require a running PostgreSQL instance; the shared query
    // paths are exercised against DuckDB.
}
