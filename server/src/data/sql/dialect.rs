//! SQL dialect trait for multi-database support

/// SQL dialect trait for generating database-specific SQL
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - DuckDB: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Cast a column to string type
    ///
    /// - DuckDB: `col::VARCHAR`
    /// - PostgreSQL: `col::TEXT`
    fn cast_to_string(&self, col: &str) -> String;

    /// Generate a LIMIT clause
    fn limit(&self, limit: u32) -> String {
        format!("LIMIT {}", limit)
    }
}
