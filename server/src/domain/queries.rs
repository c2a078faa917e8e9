//! Aggregation queries per domain
//!
//! Each domain has three fixed query shapes: a single-row KPI aggregate, a
//! monthly trend and a top-N breakdown. Aggregates are cast to
//! `DOUBLE PRECISION` so both backends decode them as `f64`.

use serde_json::Value;

use super::catalog::Domain;
use super::filters::FilterSet;
use super::sql::{WhereClause, build_where};
use crate::core::constants::QUERY_BREAKDOWN_LIMIT;
use crate::data::Statement;
use crate::data::sql::SqlDialect;

/// Placeholder preview for an unrecognized domain tag
pub const UNKNOWN_DOMAIN_PREVIEW: &str = "-- Unknown domain";

/// An aggregate expression and its output alias
type Aggregate = (&'static str, &'static str);

const SALES_KPIS: &[Aggregate] = &[
    ("SUM(revenue)", "total_revenue"),
    ("COUNT(*)", "total_orders"),
    ("AVG(revenue)", "avg_order_value"),
    ("COUNT(DISTINCT visitor_id)", "unique_visitors"),
];

const PROCUREMENT_KPIS: &[Aggregate] = &[
    ("SUM(spend)", "total_spend"),
    ("COUNT(*)", "purchase_orders"),
    ("AVG(spend)", "avg_po_value"),
    (
        "SUM(CASE WHEN actual_delivery_date IS NOT NULL AND requested_delivery_date IS NOT NULL \
         AND actual_delivery_date <= requested_delivery_date THEN 1 ELSE 0 END)",
        "on_time_count",
    ),
    (
        "SUM(CASE WHEN actual_delivery_date IS NOT NULL AND requested_delivery_date IS NOT NULL \
         THEN 1 ELSE 0 END)",
        "delivery_count",
    ),
];

const FINANCE_INCOME: &str = "SUM(CASE WHEN LOWER(account_type) = 'revenue' THEN amount ELSE 0 END)";
const FINANCE_EXPENSES: &str =
    "SUM(CASE WHEN LOWER(account_type) = 'expense' THEN ABS(amount) ELSE 0 END)";

const FINANCE_KPIS: &[Aggregate] = &[
    (FINANCE_INCOME, "total_income"),
    (FINANCE_EXPENSES, "total_expenses"),
    ("SUM(amount)", "net_income"),
    ("COUNT(*)", "posting_count"),
];

fn kpi_aggregates(domain: Domain) -> &'static [Aggregate] {
    match domain {
        Domain::Sales => SALES_KPIS,
        Domain::Procurement => PROCUREMENT_KPIS,
        Domain::Finance => FINANCE_KPIS,
    }
}

/// Trend key expression and its two series aggregates
fn trend_shape(domain: Domain) -> (&'static str, [Aggregate; 2]) {
    match domain {
        Domain::Sales => (
            "EXTRACT(MONTH FROM order_date)",
            [("SUM(revenue)", "revenue"), ("COUNT(*)", "orders")],
        ),
        Domain::Procurement => (
            "EXTRACT(MONTH FROM purchase_date)",
            [("SUM(spend)", "spend"), ("COUNT(*)", "orders")],
        ),
        Domain::Finance => (
            "posting_period",
            [(FINANCE_INCOME, "income"), (FINANCE_EXPENSES, "expenses")],
        ),
    }
}

fn breakdown_measure(domain: Domain) -> &'static str {
    match domain {
        Domain::Sales => "SUM(revenue)",
        Domain::Procurement => "SUM(spend)",
        Domain::Finance => "SUM(ABS(amount))",
    }
}

fn as_double(expr: &str) -> String {
    format!("CAST(COALESCE({}, 0) AS DOUBLE PRECISION)", expr)
}

fn select_list(aggregates: &[Aggregate]) -> String {
    aggregates
        .iter()
        .map(|(expr, alias)| format!("    {} AS {}", as_double(expr), alias))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// KPI query text around a rendered WHERE fragment
pub fn kpi_sql(domain: Domain, where_sql: &str) -> String {
    format!(
        "SELECT\n{}\nFROM {}\nWHERE {}",
        select_list(kpi_aggregates(domain)),
        domain.table(),
        where_sql
    )
}

/// Trend query text; the key column is the month number (or period for finance)
pub fn trend_sql(domain: Domain, where_sql: &str) -> String {
    let (key, series) = trend_shape(domain);
    let key_select = if domain == Domain::Finance {
        key.to_string()
    } else {
        format!("CAST(CAST({} AS INTEGER) AS VARCHAR)", key)
    };
    format!(
        "SELECT\n    {} AS month_key,\n{}\nFROM {}\nWHERE {}\nGROUP BY {}\nORDER BY {}",
        key_select,
        select_list(&series),
        domain.table(),
        where_sql,
        key,
        key
    )
}

/// Breakdown query text, top entries by value
pub fn breakdown_sql(domain: Domain, where_sql: &str, dialect: &dyn SqlDialect) -> String {
    let dimension = domain.breakdown_dimension();
    format!(
        "SELECT\n    {} AS label,\n    {} AS value\nFROM {}\nWHERE {}\nGROUP BY {}\nORDER BY value DESC\n{}",
        dimension,
        as_double(breakdown_measure(domain)),
        domain.table(),
        where_sql,
        dimension,
        dialect.limit(QUERY_BREAKDOWN_LIMIT as u32)
    )
}

/// Executable statements for one run, sharing a single WHERE clause
#[derive(Debug, Clone)]
pub struct RunStatements {
    pub kpi: Statement,
    pub trend: Statement,
    pub breakdown: Statement,
}

impl RunStatements {
    pub fn new(domain: Domain, clause: &WhereClause, dialect: &dyn SqlDialect) -> Self {
        let (where_sql, params) = clause.positional(dialect, 1);
        Self {
            kpi: Statement::new(
                kpi_sql(domain, &where_sql),
                params.clone(),
                kpi_aggregates(domain).len(),
            ),
            trend: Statement::new(trend_sql(domain, &where_sql), params.clone(), 2),
            breakdown: Statement::new(breakdown_sql(domain, &where_sql, dialect), params, 1),
        }
    }
}

/// Display SQL for a run: the KPI query with literal values inlined
pub fn preview_sql(filters: &FilterSet) -> String {
    kpi_sql(filters.domain(), &build_where(filters).literal())
}

/// Preview from raw input; failures degrade to a SQL comment
pub fn preview_for(tag: &str, raw: &Value) -> String {
    let Ok(domain) = Domain::parse(tag) else {
        return UNKNOWN_DOMAIN_PREVIEW.to_string();
    };
    match FilterSet::from_json(domain, raw) {
        Ok(filters) => preview_sql(&filters),
        Err(e) => format!("-- Invalid filters: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sql::{DuckdbDialect, PostgresDialect};
    use serde_json::json;

    #[test]
    fn test_kpi_sql_sales() {
        let sql = kpi_sql(Domain::Sales, "1=1");
        assert!(sql.starts_with("SELECT\n"));
        assert!(sql.contains("CAST(COALESCE(SUM(revenue), 0) AS DOUBLE PRECISION) AS total_revenue"));
        assert!(sql.contains("COUNT(DISTINCT visitor_id)"));
        assert!(sql.ends_with("FROM mart.sales_orders_fact\nWHERE 1=1"));
    }

    #[test]
    fn test_finance_is_case_insensitive_on_account_type() {
        let sql = kpi_sql(Domain::Finance, "1=1");
        assert!(sql.contains("LOWER(account_type) = 'revenue'"));
        assert!(sql.contains("LOWER(account_type) = 'expense' THEN ABS(amount)"));
    }

    #[test]
    fn test_trend_sql_groups_by_month() {
        let sql = trend_sql(Domain::Procurement, "1=1");
        assert!(sql.contains("CAST(CAST(EXTRACT(MONTH FROM purchase_date) AS INTEGER) AS VARCHAR) AS month_key"));
        assert!(sql.ends_with("GROUP BY EXTRACT(MONTH FROM purchase_date)\nORDER BY EXTRACT(MONTH FROM purchase_date)"));

        let sql = trend_sql(Domain::Finance, "1=1");
        assert!(sql.contains("posting_period AS month_key"));
        assert!(sql.ends_with("ORDER BY posting_period"));
    }

    #[test]
    fn test_breakdown_sql_limits() {
        let sql = breakdown_sql(Domain::Finance, "1=1", &PostgresDialect);
        assert!(sql.contains("cost_center AS label"));
        assert!(sql.contains("SUM(ABS(amount))"));
        assert!(sql.ends_with("ORDER BY value DESC\nLIMIT 10"));
    }

    #[test]
    fn test_run_statements_share_where() {
        let filters = FilterSet::from_json(
            Domain::Sales,
            &json!({ "date_from": "2025-01-01", "regions": ["DACH", "UK"] }),
        )
        .unwrap();
        let stmts = RunStatements::new(Domain::Sales, &build_where(&filters), &PostgresDialect);
        for stmt in [&stmts.kpi, &stmts.trend, &stmts.breakdown] {
            assert!(stmt.sql.contains("WHERE order_date >= $1 AND region IN ($2, $3)"));
            assert_eq!(stmt.params.len(), 3);
        }
        assert_eq!(stmts.kpi.value_columns, 4);
        assert_eq!(stmts.trend.value_columns, 2);
        assert_eq!(stmts.breakdown.value_columns, 1);

        let duck = RunStatements::new(Domain::Procurement, &WhereClause::default(), &DuckdbDialect);
        assert_eq!(duck.kpi.value_columns, 5);
        assert!(duck.kpi.params.is_empty());
    }

    #[test]
    fn test_preview_sql_inlines_literals() {
        let filters = FilterSet::from_json(
            Domain::Finance,
            &json!({ "period_from": "2025-01", "company_codes": ["C100"] }),
        )
        .unwrap();
        let preview = preview_sql(&filters);
        assert!(preview.ends_with(
            "FROM mart.gl_postings_fact\nWHERE posting_period >= '2025-01' AND company_code IN ('C100')"
        ));
        assert_eq!(preview, kpi_sql(Domain::Finance, &build_where(&filters).literal()));
    }

    #[test]
    fn test_preview_for_unknown_domain() {
        assert_eq!(preview_for("hr", &Value::Null), "-- Unknown domain");
    }

    #[test]
    fn test_preview_for_invalid_filters() {
        let preview = preview_for("sales", &json!({ "plants": ["P100"] }));
        assert!(preview.starts_with("-- Invalid filters: "));
        assert!(preview.contains("plants"));
    }

    #[test]
    fn test_preview_for_empty_filters() {
        assert!(preview_for("procurement", &Value::Null).ends_with("WHERE 1=1"));
    }
}
