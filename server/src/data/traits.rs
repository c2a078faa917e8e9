//! Repository trait for the fact database
//!
//! Both backends (PostgreSQL, DuckDB) implement this trait. Every method
//! issues SELECT statements only; the fact tables are never mutated.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::sql::Backend;
use crate::data::types::{Coverage, DatabaseStatus, GroupRow, Statement};

/// Read-only access to the domain fact tables
#[async_trait]
pub trait FactRepository: Send + Sync {
    /// Backend serving this repository
    fn backend(&self) -> Backend;

    /// Fetch the first row of a single-row aggregation
    ///
    /// Returns `None` when the statement yields no rows. NULL aggregates
    /// decode as `0.0`.
    async fn fetch_row(&self, stmt: &Statement) -> Result<Option<Vec<f64>>, DataError>;

    /// Fetch all rows of a grouped aggregation (text key + numeric values)
    async fn fetch_groups(&self, stmt: &Statement) -> Result<Vec<GroupRow>, DataError>;

    /// Distinct non-null values of a column, ascending
    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<String>, DataError>;

    /// First `limit` rows of a table, every column rendered as text
    async fn sample_rows(
        &self,
        table: &str,
        columns: &[&str],
        limit: u32,
    ) -> Result<Vec<Vec<Option<String>>>, DataError>;

    /// Earliest and latest value of a column
    async fn coverage(&self, table: &str, column: &str) -> Result<Coverage, DataError>;

    /// Connection status; never fails, errors are reported in the status
    async fn status(&self) -> DatabaseStatus;
}
