//! Run executor
//!
//! Issues the KPI, trend and breakdown queries of one run in sequence, all
//! sharing a single WHERE clause, and assembles the `RunResult`.

use std::time::Instant;

use super::catalog::Domain;
use super::error::{QueryKind, RunError};
use super::filters::{FilterSet, Period};
use super::queries::{RunStatements, kpi_sql};
use super::run::{Breakdown, Kpis, RunResult, Trend, TrendSeries};
use super::sql::build_where;
use crate::core::config::KpiFailurePolicy;
use crate::core::constants::QUERY_BREAKDOWN_LIMIT;
use crate::data::{FactRepository, GroupRow};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Label used for NULL group keys
pub const NULL_LABEL: &str = "(none)";

/// Outcome of a successful execution
#[derive(Debug, Clone)]
pub struct Execution {
    pub result: RunResult,
    pub sql_preview: String,
    /// KPIs were replaced by zeros after a non-connectivity KPI failure
    pub degraded: bool,
}

/// `numerator / denominator * 100`, or exactly 0.0 when the denominator is not positive
pub fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Turn the raw KPI row into the domain's display KPIs
fn compute_kpis(domain: Domain, row: &[f64]) -> Kpis {
    let at = |i: usize| row.get(i).copied().unwrap_or(0.0);
    let values = match domain {
        Domain::Sales => vec![
            ("total_revenue", at(0).trunc()),
            ("total_orders", at(1).trunc()),
            ("avg_order_value", round_to(at(2), 2)),
            ("conversion_rate", round_to(ratio_percent(at(1), at(3)), 1)),
        ],
        Domain::Procurement => vec![
            ("total_spend", at(0).trunc()),
            ("purchase_orders", at(1).trunc()),
            ("avg_po_value", round_to(at(2), 2)),
            ("on_time_delivery", round_to(ratio_percent(at(3), at(4)), 1)),
        ],
        Domain::Finance => {
            let (income, expenses) = (at(0), at(1));
            vec![
                ("net_income", at(2).trunc()),
                (
                    "operating_margin",
                    round_to(ratio_percent(income - expenses, income), 1),
                ),
                ("total_expenses", expenses.trunc()),
                ("posting_count", at(3).trunc()),
            ]
        }
    };
    Kpis::new(values)
}

/// Month of a trend key: a `YYYY-MM` period or a bare month number
fn month_of(key: &str) -> Option<(i32, u32)> {
    if let Ok(period) = key.parse::<Period>() {
        return Some((period.year(), period.month()));
    }
    match key.trim().parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Some((0, m)),
        _ => None,
    }
}

fn month_label(key: Option<&str>) -> String {
    match key {
        None => NULL_LABEL.to_string(),
        Some(k) => match month_of(k) {
            Some((_, m)) => MONTHS[(m - 1) as usize].to_string(),
            None => k.to_string(),
        },
    }
}

fn build_trend(domain: Domain, mut rows: Vec<GroupRow>) -> Trend {
    // calendar order, unrecognized keys last
    rows.sort_by_key(|r| {
        let month = r.key.as_deref().and_then(month_of);
        (month.is_none(), month)
    });

    let [first, second] = domain.trend_series();
    Trend {
        months: rows.iter().map(|r| month_label(r.key.as_deref())).collect(),
        series: vec![
            TrendSeries {
                name: first.to_string(),
                values: rows.iter().map(|r| r.value(0).trunc()).collect(),
            },
            TrendSeries {
                name: second.to_string(),
                values: rows.iter().map(|r| r.value(1).trunc()).collect(),
            },
        ],
    }
}

fn build_breakdown(domain: Domain, rows: Vec<GroupRow>) -> Breakdown {
    let groups = rows
        .into_iter()
        .map(|r| {
            let value = r.value(0).trunc();
            (r.key.unwrap_or_else(|| NULL_LABEL.to_string()), value)
        })
        .collect();
    Breakdown::from_groups(domain.breakdown_dimension(), groups, QUERY_BREAKDOWN_LIMIT)
}

/// Execute the three aggregation queries of a run
pub async fn execute(
    repo: &dyn FactRepository,
    filters: &FilterSet,
    policy: KpiFailurePolicy,
) -> Result<Execution, RunError> {
    let domain = filters.domain();
    let clause = build_where(filters);
    let statements = RunStatements::new(domain, &clause, repo.backend().dialect());
    let sql_preview = kpi_sql(domain, &clause.literal());
    let started = Instant::now();

    let mut degraded = false;
    let kpis = match repo.fetch_row(&statements.kpi).await {
        Ok(row) => compute_kpis(domain, &row.unwrap_or_default()),
        Err(e) if policy == KpiFailurePolicy::Degrade && !e.is_connectivity() => {
            tracing::warn!(domain = %domain, error = %e, "KPI query failed, using defaults");
            degraded = true;
            Kpis::zeroed(domain)
        }
        Err(e) => return Err(RunError::query(QueryKind::Kpi, e)),
    };

    let trend_rows = repo
        .fetch_groups(&statements.trend)
        .await
        .map_err(|e| RunError::query(QueryKind::Trend, e))?;

    let breakdown_rows = repo
        .fetch_groups(&statements.breakdown)
        .await
        .map_err(|e| RunError::query(QueryKind::Breakdown, e))?;

    tracing::debug!(
        domain = %domain,
        backend = %repo.backend(),
        params = statements.kpi.params.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        degraded,
        "Run queries executed"
    );

    Ok(Execution {
        result: RunResult {
            kpis,
            trend: build_trend(domain, trend_rows),
            breakdown: build_breakdown(domain, breakdown_rows),
        },
        sql_preview,
        degraded,
    })
}
