//! FactRepository implementation for DuckDB
//!
//! The trait is implemented for `Arc<DuckdbService>` because the connection
//! guard is not Send: the Arc is cloned into the blocking closure and the
//! connection is locked there.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::sql::Backend;
use crate::data::traits::FactRepository;
use crate::data::types::{Coverage, DatabaseStatus, GroupRow, Statement};

use super::{DuckdbService, queries};

#[async_trait]
impl FactRepository for Arc<DuckdbService> {
    fn backend(&self) -> Backend {
        Backend::Duckdb
    }

    async fn fetch_row(&self, stmt: &Statement) -> Result<Option<Vec<f64>>, DataError> {
        let db = Arc::clone(self);
        let stmt = stmt.clone();
        let started = Instant::now();
        let row = DuckdbService::run_query(move || {
            let conn = db.conn()?;
            queries::fetch_row(&conn, &stmt)
        })
        .await??;
        tracing::debug!(
            backend = "duckdb",
            elapsed_ms = started.elapsed().as_millis() as u64,
            found = row.is_some(),
            "Aggregate row fetched"
        );
        Ok(row)
    }

    async fn fetch_groups(&self, stmt: &Statement) -> Result<Vec<GroupRow>, DataError> {
        let db = Arc::clone(self);
        let stmt = stmt.clone();
        let started = Instant::now();
        let rows = DuckdbService::run_query(move || {
            let conn = db.conn()?;
            queries::fetch_groups(&conn, &stmt)
        })
        .await??;
        tracing::debug!(
            backend = "duckdb",
            elapsed_ms = started.elapsed().as_millis() as u64,
            rows = rows.len(),
            "Grouped rows fetched"
        );
        Ok(rows)
    }

    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<String>, DataError> {
        let db = Arc::clone(self);
        let table = table.to_string();
        let column = column.to_string();
        DuckdbService::run_query(move || {
            let conn = db.conn()?;
            queries::distinct_values(&conn, &table, &column)
        })
        .await?
    }

    async fn sample_rows(
        &self,
        table: &str,
        columns: &[&str],
        limit: u32,
    ) -> Result<Vec<Vec<Option<String>>>, DataError> {
        let db = Arc::clone(self);
        let table = table.to_string();
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        DuckdbService::run_query(move || {
            let conn = db.conn()?;
            queries::sample_rows(&conn, &table, &columns, limit)
        })
        .await?
    }

    async fn coverage(&self, table: &str, column: &str) -> Result<Coverage, DataError> {
        let db = Arc::clone(self);
        let table = table.to_string();
        let column = column.to_string();
        DuckdbService::run_query(move || {
            let conn = db.conn()?;
            queries::coverage(&conn, &table, &column)
        })
        .await?
    }

    async fn status(&self) -> DatabaseStatus {
        let db = Arc::clone(self);
        let result = DuckdbService::run_query(move || {
            let conn = db.conn()?;
            queries::status(&conn)
        })
        .await
        .and_then(|r| r);
        match result {
            Ok((database, version)) => DatabaseStatus::connected(Backend::Duckdb, database, version),
            Err(e) => DatabaseStatus::disconnected(Backend::Duckdb, e.to_string()),
        }
    }
}
