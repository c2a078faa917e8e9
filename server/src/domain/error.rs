//! Domain and run error types

use thiserror::Error;
use uuid::Uuid;

use super::catalog::Domain;
use super::run::RunStatus;
use crate::data::DataError;

/// Errors raised while resolving domains or building filter sets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown domain '{0}'. Expected one of: sales, procurement, finance")]
    UnknownDomain(String),

    #[error("Filters must be a JSON object")]
    NotAnObject,

    #[error("Unknown filter field '{field}' for domain {domain}")]
    UnknownField { domain: Domain, field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid range: {from_field} ({from}) is after {to_field} ({to})")]
    InvertedRange {
        from_field: &'static str,
        to_field: &'static str,
        from: String,
        to: String,
    },

    #[error("Unknown value '{value}' for '{field}'")]
    UnknownOption { field: String, value: String },
}

impl DomainError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Which of the three run queries failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Kpi,
    Trend,
    Breakdown,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKind::Kpi => write!(f, "KPI"),
            QueryKind::Trend => write!(f, "Trend"),
            QueryKind::Breakdown => write!(f, "Breakdown"),
        }
    }
}

/// Errors raised while executing runs or managing their lifecycle
#[derive(Error, Debug)]
pub enum RunError {
    #[error("{kind} query failed: {source}")]
    Query {
        kind: QueryKind,
        #[source]
        source: DataError,
    },

    #[error("Invalid run transition from {from} to {to}")]
    InvalidTransition { from: RunStatus, to: RunStatus },

    #[error("Run not found: {0}")]
    NotFound(Uuid),
}

impl RunError {
    pub fn query(kind: QueryKind, source: DataError) -> Self {
        Self::Query { kind, source }
    }

    /// Check if the run failed because the database could not be reached
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Query { source, .. } if source.is_connectivity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_domain_display() {
        let err = DomainError::UnknownDomain("hr".into());
        assert_eq!(
            err.to_string(),
            "Unknown domain 'hr'. Expected one of: sales, procurement, finance"
        );
    }

    #[test]
    fn test_run_error_query_display() {
        let err = RunError::query(QueryKind::Kpi, DataError::timeout("duckdb", 30));
        assert_eq!(
            err.to_string(),
            "KPI query failed: Query timeout after 30s on duckdb"
        );
        assert!(err.is_connectivity());
    }

    #[test]
    fn test_run_error_not_connectivity() {
        let err = RunError::query(QueryKind::Trend, DataError::decode("duckdb", "bad row"));
        assert!(!err.is_connectivity());
        assert!(!RunError::NotFound(Uuid::nil()).is_connectivity());
    }
}
