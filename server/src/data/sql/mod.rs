//! SQL abstraction layer for multi-database support
//!
//! Query text is shared across backends; dialects only supply the syntax
//! that differs (parameter placeholders, string casts, row limits).

mod dialect;
mod duckdb_dialect;
mod inspect;
mod postgres_dialect;

pub use dialect::SqlDialect;
pub use duckdb_dialect::DuckdbDialect;
pub use inspect::{coverage_sql, distinct_values_sql, sample_rows_sql, status_sql};
pub use postgres_dialect::PostgresDialect;

use serde::Serialize;

/// Database backend identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Postgres,
    Duckdb,
}

impl Backend {
    /// Get the SQL dialect for this backend
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Backend::Postgres => &PostgresDialect,
            Backend::Duckdb => &DuckdbDialect,
        }
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Duckdb => "duckdb",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_dialect_matches_name() {
        assert_eq!(Backend::Postgres.dialect().name(), "postgres");
        assert_eq!(Backend::Duckdb.dialect().name(), "duckdb");
        assert_eq!(Backend::Duckdb.to_string(), "duckdb");
    }
}
