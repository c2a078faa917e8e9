//! Run records and their results

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::Domain;
use super::error::RunError;
use super::filters::FilterSet;

/// Run lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// KPI name -> value, in declared order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kpis(Vec<(&'static str, f64)>);

impl Kpis {
    pub fn new(values: Vec<(&'static str, f64)>) -> Self {
        Self(values)
    }

    /// All KPIs of a domain set to zero
    pub fn zeroed(domain: Domain) -> Self {
        Self(domain.kpi_names().iter().map(|name| (*name, 0.0)).collect())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(n, _)| *n).collect()
    }
}

impl Serialize for Kpis {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrendSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Monthly trend: labels plus two series of the same length
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Trend {
    pub months: Vec<String>,
    pub series: Vec<TrendSeries>,
}

/// Top entries of the domain's breakdown dimension, descending
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Breakdown {
    pub dimension: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Breakdown {
    /// Build from (label, value) groups: stable sort descending, then keep `limit`
    pub fn from_groups(dimension: &str, mut groups: Vec<(String, f64)>, limit: usize) -> Self {
        groups.sort_by(|a, b| b.1.total_cmp(&a.1));
        groups.truncate(limit);
        let (labels, values) = groups.into_iter().unzip();
        Self {
            dimension: dimension.to_string(),
            labels,
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RunResult {
    #[schema(value_type = Object)]
    pub kpis: Kpis,
    pub trend: Trend,
    pub breakdown: Breakdown,
}

/// One executed analysis
///
/// Created `Running`, then moves once to `Completed` (with a result) or
/// `Failed` (with an error). Terminal runs never change.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Run {
    id: Uuid,
    domain: Domain,
    #[schema(value_type = Object)]
    filters: Value,
    filter_summary: String,
    executed_at: DateTime<Utc>,
    status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<RunResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    sql_preview: String,
    degraded: bool,
}

impl Run {
    /// New pending run for a filter set
    pub fn new(filters: &FilterSet, sql_preview: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: filters.domain(),
            filters: filters.to_json(),
            filter_summary: filters.summary(),
            executed_at: Utc::now(),
            status: RunStatus::Pending,
            result: None,
            error: None,
            sql_preview,
            degraded: false,
        }
    }

    fn transition(&mut self, to: RunStatus) -> Result<(), RunError> {
        let allowed = matches!(
            (self.status, to),
            (RunStatus::Pending, RunStatus::Running)
                | (RunStatus::Running, RunStatus::Completed)
                | (RunStatus::Running, RunStatus::Failed)
        );
        if !allowed {
            return Err(RunError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), RunError> {
        self.transition(RunStatus::Running)
    }

    pub fn complete(&mut self, result: RunResult, degraded: bool) -> Result<(), RunError> {
        self.transition(RunStatus::Completed)?;
        self.result = Some(result);
        self.degraded = degraded;
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), RunError> {
        self.transition(RunStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn filters(&self) -> &Value {
        &self.filters
    }

    pub fn filter_summary(&self) -> &str {
        &self.filter_summary
    }

    pub fn executed_at(&self) -> DateTime<Utc> {
        self.executed_at
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sql_preview(&self) -> &str {
        &self.sql_preview
    }

    pub fn degraded(&self) -> bool {
        self.degraded
    }

    #[cfg(test)]
    pub(crate) fn set_executed_at(&mut self, at: DateTime<Utc>) {
        self.executed_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result() -> RunResult {
        RunResult {
            kpis: Kpis::zeroed(Domain::Sales),
            trend: Trend::default(),
            breakdown: Breakdown::from_groups("region", vec![], 10),
        }
    }

    fn run() -> Run {
        Run::new(&FilterSet::empty(Domain::Sales), "SELECT 1".into())
    }

    #[test]
    fn test_new_run_is_pending() {
        let run = run();
        assert_eq!(run.status(), RunStatus::Pending);
        assert_eq!(run.filter_summary(), "No filters");
        assert_eq!(run.filters(), &json!({}));
        assert!(run.result().is_none());
        assert!(run.error().is_none());
    }

    #[test]
    fn test_complete_lifecycle() {
        let mut run = run();
        run.start().unwrap();
        run.complete(result(), true).unwrap();
        assert_eq!(run.status(), RunStatus::Completed);
        assert!(run.result().is_some());
        assert!(run.degraded());
    }

    #[test]
    fn test_fail_lifecycle() {
        let mut run = run();
        run.start().unwrap();
        run.fail("connection refused").unwrap();
        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(run.error(), Some("connection refused"));
        assert!(run.result().is_none());
    }

    #[test]
    fn test_terminal_runs_are_immutable() {
        let mut run = run();
        run.start().unwrap();
        run.fail("boom").unwrap();

        let err = run.complete(result(), false).unwrap_err();
        assert!(matches!(
            err,
            RunError::InvalidTransition {
                from: RunStatus::Failed,
                to: RunStatus::Completed
            }
        ));
        assert!(run.start().is_err());
        assert!(run.fail("again").is_err());
        assert_eq!(run.error(), Some("boom"));
    }

    #[test]
    fn test_complete_requires_running() {
        let mut run = run();
        assert!(run.complete(result(), false).is_err());
        assert_eq!(run.status(), RunStatus::Pending);
    }

    #[test]
    fn test_breakdown_from_groups_sorts_and_truncates() {
        let groups = (0..12).map(|i| (format!("g{}", i), (i % 4) as f64)).collect();
        let breakdown = Breakdown::from_groups("region", groups, 10);
        assert_eq!(breakdown.labels.len(), 10);
        assert_eq!(breakdown.values.len(), 10);
        assert!(breakdown.values.windows(2).all(|w| w[0] >= w[1]));
        // ties keep input order
        assert_eq!(&breakdown.labels[..3], &["g3", "g7", "g11"]);
    }

    #[test]
    fn test_run_serialization() {
        let mut run = run();
        run.start().unwrap();
        run.complete(result(), false).unwrap();
        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["domain"], "sales");
        assert_eq!(value["result"]["kpis"]["total_revenue"], 0.0);
        assert_eq!(value["result"]["breakdown"]["dimension"], "region");
        assert!(value.get("error").is_none());
        assert_eq!(value["degraded"], false);
    }

    #[test]
    fn test_kpis_keep_declared_order() {
        let kpis = Kpis::zeroed(Domain::Finance);
        assert_eq!(
            kpis.names(),
            vec!["net_income", "operating_margin", "total_expenses", "posting_count"]
        );
        let json = serde_json::to_string(&kpis).unwrap();
        assert!(json.starts_with(r#"{"net_income":0.0"#));
    }
}
