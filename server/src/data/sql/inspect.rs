//! Catalog-style SELECT statements shared by both backends
//!
//! Table and column names come from the static domain catalog; they are
//! still checked before being spliced into SQL text.

use super::SqlDialect;
use crate::data::error::DataError;
use crate::utils::sql::is_identifier;

fn check_identifier(dialect: &dyn SqlDialect, name: &str) -> Result<(), DataError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(DataError::Config(format!(
            "invalid identifier '{}' for {}",
            name,
            dialect.name()
        )))
    }
}

/// Distinct non-null values of a column, ascending
pub fn distinct_values_sql(
    dialect: &dyn SqlDialect,
    table: &str,
    column: &str,
) -> Result<String, DataError> {
    check_identifier(dialect, table)?;
    check_identifier(dialect, column)?;
    Ok(format!(
        "SELECT DISTINCT {} AS value FROM {} WHERE {} IS NOT NULL ORDER BY value",
        dialect.cast_to_string(column),
        table,
        column
    ))
}

/// First `limit` rows with every column rendered as text
pub fn sample_rows_sql(
    dialect: &dyn SqlDialect,
    table: &str,
    columns: &[&str],
    limit: u32,
) -> Result<String, DataError> {
    check_identifier(dialect, table)?;
    if columns.is_empty() {
        return Err(DataError::Config("sample requires at least one column".into()));
    }
    let mut select = Vec::with_capacity(columns.len());
    for column in columns {
        check_identifier(dialect, column)?;
        select.push(format!("{} AS {}", dialect.cast_to_string(column), column));
    }
    Ok(format!(
        "SELECT {} FROM {} {}",
        select.join(", "),
        table,
        dialect.limit(limit)
    ))
}

/// Earliest and latest value of a column, as text
pub fn coverage_sql(
    dialect: &dyn SqlDialect,
    table: &str,
    column: &str,
) -> Result<String, DataError> {
    check_identifier(dialect, table)?;
    check_identifier(dialect, column)?;
    Ok(format!(
        "SELECT {} AS min_value, {} AS max_value FROM {}",
        dialect.cast_to_string(&format!("MIN({})", column)),
        dialect.cast_to_string(&format!("MAX({})", column)),
        table
    ))
}

/// Database name and server version
pub fn status_sql(dialect: &dyn SqlDialect) -> String {
    format!(
        "SELECT {} AS database_name, {} AS server_version",
        dialect.cast_to_string("current_database()"),
        dialect.cast_to_string("version()")
    )
}
