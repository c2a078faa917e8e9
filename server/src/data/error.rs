//! Unified error type for data layer
//!
//! Represents errors from both fact database backends (PostgreSQL, DuckDB)
//! while preserving which backend produced them.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// PostgreSQL database error
    #[error("PostgreSQL error: {0}")]
    Postgres(sqlx::Error),

    /// DuckDB database error
    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Query timeout
    #[error("Query timeout after {timeout_secs}s on {backend}")]
    Timeout {
        backend: &'static str,
        timeout_secs: u64,
    },

    /// Backend not available (closed, unreachable, worker crashed)
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// A result row did not have the expected shape
    #[error("Unexpected result from {backend}: {message}")]
    Decode {
        backend: &'static str,
        message: String,
    },
}

impl DataError {
    /// Create a PostgreSQL error with preserved context
    pub fn from_postgres(e: sqlx::Error) -> Self {
        Self::Postgres(e)
    }

    /// Create a timeout error
    pub fn timeout(backend: &'static str, timeout_secs: u64) -> Self {
        Self::Timeout {
            backend,
            timeout_secs,
        }
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Create a decode error
    pub fn decode(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            backend,
            message: message.into(),
        }
    }

    /// Check if the database could not be reached at all
    ///
    /// Connectivity failures always fail a run; other query errors may be
    /// absorbed by the degraded KPI policy.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::BackendUnavailable { .. } | Self::Io(_) => true,
            Self::Postgres(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::WorkerCrashed
            ),
            Self::Duckdb(_) | Self::Config(_) | Self::Decode { .. } => false,
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Duckdb(_) => "duckdb",
            Self::Timeout { backend, .. } => backend,
            Self::BackendUnavailable { backend, .. } => backend,
            Self::Decode { backend, .. } => backend,
            Self::Config(_) | Self::Io(_) => "unknown",
        }
    }
}
