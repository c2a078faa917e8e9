//! Synchronous DuckDB query functions
//!
//! Each function takes the locked connection and runs on a blocking thread
//! (see `DuckdbService::run_query`).

use chrono::NaiveDate;
use duckdb::types::Value;
use duckdb::{Connection, Row, params_from_iter};

use crate::data::error::DataError;
use crate::data::sql::{
    DuckdbDialect, coverage_sql, distinct_values_sql, sample_rows_sql, status_sql,
};
use crate::data::types::{Coverage, GroupRow, SqlValue, Statement};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn to_duckdb_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Date(d) => Value::Date32(days_since_epoch(*d)),
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn read_values(row: &Row<'_>, offset: usize, count: usize) -> Result<Vec<f64>, duckdb::Error> {
    (offset..offset + count)
        .map(|i| row.get::<_, Option<f64>>(i).map(|v| v.unwrap_or(0.0)))
        .collect()
}

pub fn fetch_row(conn: &Connection, stmt: &Statement) -> Result<Option<Vec<f64>>, DataError> {
    let mut prepared = conn.prepare(&stmt.sql)?;
    let mut rows = prepared.query(params_from_iter(stmt.params.iter().map(to_duckdb_value)))?;
    match rows.next()? {
        Some(row) => Ok(Some(read_values(row, 0, stmt.value_columns)?)),
        None => Ok(None),
    }
}

pub fn fetch_groups(conn: &Connection, stmt: &Statement) -> Result<Vec<GroupRow>, DataError> {
    let mut prepared = conn.prepare(&stmt.sql)?;
    let rows = prepared.query_map(
        params_from_iter(stmt.params.iter().map(to_duckdb_value)),
        |row| {
            Ok(GroupRow {
                key: row.get::<_, Option<String>>(0)?,
                values: read_values(row, 1, stmt.value_columns)?,
            })
        },
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn distinct_values(
    conn: &Connection,
    table: &str,
    column: &str,
) -> Result<Vec<String>, DataError> {
    let sql = distinct_values_sql(&DuckdbDialect, table, column)?;
    let mut prepared = conn.prepare(&sql)?;
    let rows = prepared.query_map([], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn sample_rows(
    conn: &Connection,
    table: &str,
    columns: &[String],
    limit: u32,
) -> Result<Vec<Vec<Option<String>>>, DataError> {
    let names: Vec<&str> = columns.iter().map(String::as_str).collect();
    let sql = sample_rows_sql(&DuckdbDialect, table, &names, limit)?;
    let mut prepared = conn.prepare(&sql)?;
    let width = columns.len();
    let rows = prepared.query_map([], |row| {
        (0..width)
            .map(|i| row.get::<_, Option<String>>(i))
            .collect::<Result<Vec<_>, _>>()
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn coverage(conn: &Connection, table: &str, column: &str) -> Result<Coverage, DataError> {
    let sql = coverage_sql(&DuckdbDialect, table, column)?;
    let coverage = conn.query_row(&sql, [], |row| {
        Ok(Coverage {
            min: row.get(0)?,
            max: row.get(1)?,
        })
    })?;
    Ok(coverage)
}

pub fn status(conn: &Connection) -> Result<(String, String), DataError> {
    let info = conn.query_row(&status_sql(&DuckdbDialect), [], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::duckdb::fixtures;

    #[test]
    fn test_days_since_epoch() {
        assert_eq!(days_since_epoch(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(days_since_epoch(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1);
        assert_eq!(
            days_since_epoch(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()),
            -1
        );
    }

    #[test]
    fn test_fetch_row_binds_dates() {
        let conn = fixtures::seeded_connection();
        let stmt = Statement::new(
            "SELECT CAST(COUNT(*) AS DOUBLE PRECISION), CAST(SUM(revenue) AS DOUBLE PRECISION) \
             FROM mart.sales_orders_fact WHERE order_date >= ? AND order_date <= ?",
            vec![
                SqlValue::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
                SqlValue::Date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()),
            ],
            2,
        );
        let row = fetch_row(&conn, &stmt).unwrap().unwrap();
        assert_eq!(row, vec![3.0, 600.0]);
    }

    #[test]
    fn test_fetch_row_null_aggregate_is_zero() {
        let conn = fixtures::seeded_connection();
        let stmt = Statement::new(
            "SELECT CAST(SUM(revenue) AS DOUBLE PRECISION) FROM mart.sales_orders_fact \
             WHERE region = ?",
            vec![SqlValue::Text("Nowhere".into())],
            1,
        );
        assert_eq!(fetch_row(&conn, &stmt).unwrap(), Some(vec![0.0]));
    }

    #[test]
    fn test_fetch_groups_with_text_key() {
        let conn = fixtures::seeded_connection();
        let stmt = Statement::new(
            "SELECT region, CAST(SUM(revenue) AS DOUBLE PRECISION) AS value \
             FROM mart.sales_orders_fact GROUP BY region ORDER BY value DESC",
            vec![],
            1,
        );
        let groups = fetch_groups(&conn, &stmt).unwrap();
        assert_eq!(groups[0].key.as_deref(), Some("DACH"));
        assert!(groups.windows(2).all(|w| w[0].value(0) >= w[1].value(0)));
    }

    #[test]
    fn test_distinct_values_sorted() {
        let conn = fixtures::seeded_connection();
        let regions = distinct_values(&conn, "mart.sales_orders_fact", "region").unwrap();
        assert_eq!(regions, vec!["DACH", "Nordics", "UK"]);
    }

    #[test]
    fn test_sample_rows_as_text() {
        let conn = fixtures::seeded_connection();
        let columns = vec!["order_date".to_string(), "region".to_string()];
        let rows = sample_rows(&conn, "mart.sales_orders_fact", &columns, 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert!(rows[0][0].as_deref().unwrap().starts_with("2025-"));
    }

    #[test]
    fn test_coverage() {
        let conn = fixtures::seeded_connection();
        let range = coverage(&conn, "mart.gl_postings_fact", "posting_period").unwrap();
        assert_eq!(range.min.as_deref(), Some("2025-01"));
        assert_eq!(range.max.as_deref(), Some("2025-03"));
    }

    #[test]
    fn test_missing_table_is_not_connectivity() {
        let conn = Connection::open_in_memory().unwrap();
        let err = distinct_values(&conn, "mart.sales_orders_fact", "region").unwrap_err();
        assert!(!err.is_connectivity());
    }

    #[test]
    fn test_status() {
        let conn = Connection::open_in_memory().unwrap();
        let (database, version) = status(&conn).unwrap();
        assert!(!database.is_empty());
        assert!(!version.is_empty());
    }
}
