//! DuckDB fact database service
//!
//! Embedded alternative to PostgreSQL for local marts and tests. A single
//! connection is shared behind a mutex; file databases open read-only.

#[cfg(test)]
pub(crate) mod fixtures;
mod queries;
mod repository_impl;

use std::path::Path;
use std::time::Duration;

use duckdb::{AccessMode, Config, Connection};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::core::config::DatabaseTarget;
use crate::core::constants::DUCKDB_QUERY_TIMEOUT_SECS;
use crate::data::error::DataError;

/// DuckDB fact database service
pub struct DuckdbService {
    conn: Mutex<Option<Connection>>,
}

impl Drop for DuckdbService {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.get_mut().take()
            && let Err((_, e)) = conn.close()
        {
            tracing::warn!("DuckDB connection close failed during drop: {}", e);
        }
    }
}

impl DuckdbService {
    /// Open the database on a blocking thread
    pub async fn init(target: &DatabaseTarget) -> Result<Self, DataError> {
        let target = target.clone();
        let service = tokio::task::spawn_blocking(move || Self::open(&target))
            .await
            .map_err(|e| DataError::Io(std::io::Error::other(e)))??;
        Ok(service)
    }

    /// Open the database synchronously
    pub fn open(target: &DatabaseTarget) -> Result<Self, DataError> {
        let conn = match target {
            DatabaseTarget::Duckdb { path: None } => Connection::open_in_memory()?,
            DatabaseTarget::Duckdb { path: Some(path) } => Self::open_read_only(path)?,
            DatabaseTarget::Postgres { .. } => {
                return Err(DataError::Config(
                    "DuckDB service requires a duckdb:// URL".into(),
                ));
            }
        };
        tracing::debug!(database = %target.redacted(), "DuckdbService initialized");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn open_read_only(path: &Path) -> Result<Connection, DataError> {
        if !path.exists() {
            return Err(DataError::backend_unavailable(
                "duckdb",
                format!("database file not found: {}", path.display()),
            ));
        }
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        Ok(Connection::open_with_flags(path, config)?)
    }

    /// Get exclusive access to the connection
    ///
    /// Fails with `BackendUnavailable` after `close()`.
    pub fn conn(&self) -> Result<MappedMutexGuard<'_, Connection>, DataError> {
        MutexGuard::try_map(self.conn.lock(), |opt| opt.as_mut())
            .map_err(|_| DataError::backend_unavailable("duckdb", "connection closed"))
    }

    /// Check if the connection is still open
    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Run a blocking DuckDB query with timeout
    pub async fn run_query<T, F>(f: F) -> Result<T, DataError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let timeout = Duration::from_secs(DUCKDB_QUERY_TIMEOUT_SECS);
        tokio::time::timeout(timeout, tokio::task::spawn_blocking(f))
            .await
            .map_err(|_| {
                tracing::warn!(
                    "DuckDB query timed out after {}s",
                    DUCKDB_QUERY_TIMEOUT_SECS
                );
                DataError::timeout("duckdb", DUCKDB_QUERY_TIMEOUT_SECS)
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "DuckDB query task failed");
                DataError::backend_unavailable("duckdb", format!("query task failed: {}", e))
            })
    }

    /// Close the connection; later queries fail as unavailable
    pub async fn close(&self) {
        let conn = self.conn.lock().take();
        if let Some(conn) = conn {
            let result = tokio::task::spawn_blocking(move || conn.close()).await;
            match result {
                Ok(Ok(())) => tracing::debug!("DuckDB connection closed"),
                Ok(Err((_, e))) => tracing::warn!("DuckDB close failed: {}", e),
                Err(e) => tracing::warn!("DuckDB close task failed: {}", e),
            }
        }
    }
}
