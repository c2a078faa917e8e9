//! FactRepository implementation for PostgreSQL

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use crate::data::error::DataError;
use crate::data::sql::{
    Backend, PostgresDialect, coverage_sql, distinct_values_sql, sample_rows_sql, status_sql,
};
use crate::data::traits::FactRepository;
use crate::data::types::{Coverage, DatabaseStatus, GroupRow, SqlValue, Statement};

use super::PostgresService;

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Date(d) => query.bind(*d),
        };
    }
    query
}

fn decode_values(row: &PgRow, offset: usize, count: usize) -> Result<Vec<f64>, DataError> {
    (offset..offset + count)
        .map(|i| {
            row.try_get::<Option<f64>, _>(i)
                .map(|v| v.unwrap_or(0.0))
                .map_err(DataError::from_postgres)
        })
        .collect()
}

#[async_trait]
impl FactRepository for Arc<PostgresService> {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn fetch_row(&self, stmt: &Statement) -> Result<Option<Vec<f64>>, DataError> {
        let started = Instant::now();
        let row = bind_params(sqlx::query(&stmt.sql), &stmt.params)
            .fetch_optional(self.pool())
            .await
            .map_err(DataError::from_postgres)?;
        tracing::debug!(
            backend = "postgres",
            elapsed_ms = started.elapsed().as_millis() as u64,
            found = row.is_some(),
            "Aggregate row fetched"
        );
        row.map(|r| decode_values(&r, 0, stmt.value_columns))
            .transpose()
    }

    async fn fetch_groups(&self, stmt: &Statement) -> Result<Vec<GroupRow>, DataError> {
        let started = Instant::now();
        let rows = bind_params(sqlx::query(&stmt.sql), &stmt.params)
            .fetch_all(self.pool())
            .await
            .map_err(DataError::from_postgres)?;
        tracing::debug!(
            backend = "postgres",
            elapsed_ms = started.elapsed().as_millis() as u64,
            rows = rows.len(),
            "Grouped rows fetched"
        );
        rows.iter()
            .map(|row| {
                Ok(GroupRow {
                    key: row
                        .try_get::<Option<String>, _>(0)
                        .map_err(DataError::from_postgres)?,
                    values: decode_values(row, 1, stmt.value_columns)?,
                })
            })
            .collect()
    }

    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<String>, DataError> {
        let sql = distinct_values_sql(&PostgresDialect, table, column)?;
        sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(DataError::from_postgres)
    }

    async fn sample_rows(
        &self,
        table: &str,
        columns: &[&str],
        limit: u32,
    ) -> Result<Vec<Vec<Option<String>>>, DataError> {
        let sql = sample_rows_sql(&PostgresDialect, table, columns, limit)?;
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(DataError::from_postgres)?;
        rows.iter()
            .map(|row| {
                (0..columns.len())
                    .map(|i| {
                        row.try_get::<Option<String>, _>(i)
                            .map_err(DataError::from_postgres)
                    })
                    .collect()
            })
            .collect()
    }

    async fn coverage(&self, table: &str, column: &str) -> Result<Coverage, DataError> {
        let sql = coverage_sql(&PostgresDialect, table, column)?;
        let (min, max) = sqlx::query_as::<_, (Option<String>, Option<String>)>(&sql)
            .fetch_one(self.pool())
            .await
            .map_err(DataError::from_postgres)?;
        Ok(Coverage { min, max })
    }

    async fn status(&self) -> DatabaseStatus {
        match sqlx::query_as::<_, (String, String)>(&status_sql(&PostgresDialect))
            .fetch_one(self.pool())
            .await
        {
            Ok((database, version)) => DatabaseStatus::connected(Backend::Postgres, database, version),
            Err(e) => DatabaseStatus::disconnected(Backend::Postgres, e.to_string()),
        }
    }
}
