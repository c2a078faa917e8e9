//! Query statements and result rows exchanged with the repositories

use chrono::NaiveDate;

/// A bound argument of a positional statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Date(NaiveDate),
}

impl SqlValue {
    /// Render the value as text (dates as `YYYY-MM-DD`)
    pub fn as_text(&self) -> String {
        match self {
            SqlValue::Text(s) => s.clone(),
            SqlValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// A SELECT statement with positional placeholders and its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
    /// Number of numeric columns the statement yields per row
    ///
    /// For grouped statements this excludes the leading key column.
    pub value_columns: usize,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>, value_columns: usize) -> Self {
        Self {
            sql: sql.into(),
            params,
            value_columns,
        }
    }
}

/// One row of a grouped aggregation: text key plus numeric values
///
/// NULL aggregates decode as `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: Option<String>,
    pub values: Vec<f64>,
}

impl GroupRow {
    /// Value at `index`, or `0.0` when the row is shorter
    pub fn value(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_as_text() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(SqlValue::Date(date).as_text(), "2025-01-31");
        assert_eq!(SqlValue::Text("2025-03".into()).as_text(), "2025-03");
    }

    #[test]
    fn test_group_row_value_out_of_range() {
        let row = GroupRow {
            key: Some("DACH".into()),
            values: vec![12.5],
        };
        assert_eq!(row.value(0), 12.5);
        assert_eq!(row.value(3), 0.0);
    }
}
