//! Data storage layer
//!
//! Read-only access to the domain fact tables:
//! - `postgres` - PostgreSQL backend (sqlx connection pool)
//! - `duckdb` - Embedded DuckDB backend (local marts, tests)
//! - `traits` - `FactRepository`, the backend-agnostic query interface
//! - `types` - Statements, rows and status types shared by both backends
//! - `sql` - Dialects and shared catalog statements
//! - `error` - Unified error type for both backends

pub mod duckdb;
pub mod error;
pub mod postgres;
pub mod sql;
pub mod traits;
pub mod types;

pub use duckdb::DuckdbService;
pub use postgres::PostgresService;

pub use error::DataError;
pub use sql::Backend;
pub use traits::FactRepository;
pub use types::{Coverage, DatabaseStatus, GroupRow, SqlValue, Statement};

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::config::{DatabaseBackend, DatabaseConfig};

/// Fact database service enum
///
/// Wraps the backend selected by the connection string. Services are stored
/// as Arc so repositories can be handed out cheaply.
pub enum FactService {
    /// PostgreSQL backend
    Postgres(Arc<PostgresService>),
    /// DuckDB backend (file or in-memory)
    Duckdb(Arc<DuckdbService>),
}

impl FactService {
    /// Initialize the fact service from configuration
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        let service = match config.target.backend() {
            DatabaseBackend::Postgres => Self::Postgres(Arc::new(PostgresService::init(config)?)),
            DatabaseBackend::Duckdb => {
                Self::Duckdb(Arc::new(DuckdbService::init(&config.target).await?))
            }
        };
        tracing::debug!(
            backend = %service.backend(),
            database = %config.target.redacted(),
            "Fact database initialized"
        );
        Ok(service)
    }

    /// Get the backend type
    pub fn backend(&self) -> Backend {
        match self {
            Self::Postgres(_) => Backend::Postgres,
            Self::Duckdb(_) => Backend::Duckdb,
        }
    }

    /// Get the repository trait object for queries
    pub fn repository(&self) -> Box<dyn FactRepository> {
        match self {
            Self::Postgres(p) => Box::new(Arc::clone(p)),
            Self::Duckdb(d) => Box::new(Arc::clone(d)),
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Postgres(p) => p.close().await,
            Self::Duckdb(d) => d.close().await,
        }
    }

    /// Start the background health check task (PostgreSQL only)
    pub fn start_health_check_task(
        &self,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        match self {
            Self::Postgres(p) => Some(p.start_health_check_task(shutdown_rx)),
            Self::Duckdb(_) => None,
        }
    }
}
