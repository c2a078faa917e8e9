//! Source inspection
//!
//! Table info with sample rows, filter options and database status. Each
//! fetch that can fall back reports it through an explicit `degraded` flag
//! instead of failing the request.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::catalog::{Column, Domain};
use crate::core::config::StaticFilterOptions;
use crate::core::constants::QUERY_SAMPLE_ROWS;
use crate::data::{Coverage, DatabaseStatus, DataError, FactRepository};

/// Fact table description plus a few sample rows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableInfo {
    pub domain: Domain,
    pub table: String,
    pub description: String,
    #[schema(value_type = Vec<Object>)]
    pub schema: Vec<Column>,
    #[schema(value_type = Vec<Object>)]
    pub sample_rows: Vec<Map<String, Value>>,
    /// Sample rows could not be fetched
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where filter option values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OptionSource {
    Database,
    Static,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OptionList {
    pub field: String,
    pub column: String,
    pub values: Vec<String>,
}

/// Selectable values for a domain's multi-select filters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FilterOptions {
    pub domain: Domain,
    pub options: Vec<OptionList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub coverage: Option<Coverage>,
    pub source: OptionSource,
    /// Values are a fallback, not read from the database
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FilterOptions {
    pub fn values(&self, field: &str) -> Option<&[String]> {
        self.options
            .iter()
            .find(|o| o.field == field)
            .map(|o| o.values.as_slice())
    }
}

/// Describe a domain's table with up to a handful of sample rows
pub async fn table_info(repo: &dyn FactRepository, domain: Domain) -> TableInfo {
    let columns: Vec<&str> = domain.schema().iter().map(|c| c.name).collect();
    let (sample_rows, error) = match repo
        .sample_rows(domain.table(), &columns, QUERY_SAMPLE_ROWS)
        .await
    {
        Ok(rows) => (
            rows.into_iter()
                .map(|row| {
                    columns
                        .iter()
                        .zip(row)
                        .map(|(name, value)| {
                            (name.to_string(), value.map(Value::String).unwrap_or(Value::Null))
                        })
                        .collect()
                })
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!(domain = %domain, error = %e, "Sample rows unavailable");
            (Vec::new(), Some(e.to_string()))
        }
    };

    TableInfo {
        domain,
        table: domain.table().to_string(),
        description: domain.description().to_string(),
        schema: domain.schema().to_vec(),
        sample_rows,
        degraded: error.is_some(),
        error,
    }
}

async fn database_options(
    repo: &dyn FactRepository,
    domain: Domain,
) -> Result<Vec<OptionList>, DataError> {
    let mut options = Vec::new();
    for (field, column) in domain.filter_option_columns() {
        let values = repo.distinct_values(domain.table(), column).await?;
        options.push(OptionList {
            field: field.to_string(),
            column: column.to_string(),
            values,
        });
    }
    Ok(options)
}

/// Option lists for every multi-select field (plus finance periods)
///
/// A failed lookup replaces the whole set with the configured static lists,
/// or with empty lists when none are configured.
pub async fn filter_options(
    repo: &dyn FactRepository,
    domain: Domain,
    statics: &StaticFilterOptions,
) -> FilterOptions {
    let coverage = match repo.coverage(domain.table(), domain.date_column()).await {
        Ok(coverage) => Some(coverage),
        Err(e) => {
            tracing::warn!(domain = %domain, error = %e, "Coverage unavailable");
            None
        }
    };

    match database_options(repo, domain).await {
        Ok(options) => FilterOptions {
            domain,
            options,
            coverage,
            source: OptionSource::Database,
            degraded: false,
            error: None,
        },
        Err(e) => {
            let configured = statics.get(&domain);
            let source = if configured.is_some() {
                OptionSource::Static
            } else {
                OptionSource::None
            };
            tracing::warn!(
                domain = %domain,
                source = ?source,
                error = %e,
                "Filter options unavailable, using fallback"
            );
            let options = domain
                .filter_option_columns()
                .iter()
                .map(|(field, column)| OptionList {
                    field: field.to_string(),
                    column: column.to_string(),
                    values: configured
                        .and_then(|lists| lists.get(*field))
                        .cloned()
                        .unwrap_or_default(),
                })
                .collect();
            FilterOptions {
                domain,
                options,
                coverage,
                source,
                degraded: true,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Current connection status of the fact database
pub async fn database_status(repo: &dyn FactRepository) -> DatabaseStatus {
    let status = repo.status().await;
    if !status.connected {
        tracing::warn!(
            backend = %status.backend,
            error = status.error.as_deref().unwrap_or_default(),
            "Fact database not reachable"
        );
    }
    status
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::duckdb::fixtures;

    #[tokio::test]
    async fn test_table_info_with_samples() {
        let repo = fixtures::seeded_service();
        let info = table_info(&repo, Domain::Sales).await;
        assert_eq!(info.table, "mart.sales_orders_fact");
        assert_eq!(info.schema.len(), 6);
        assert_eq!(info.sample_rows.len(), 5);
        assert!(!info.degraded);
        assert!(info.sample_rows[0].contains_key("region"));
        assert_eq!(
            info.sample_rows[0].keys().next().map(String::as_str),
            Some("order_date")
        );
    }

    #[tokio::test]
    async fn test_table_info_null_cells() {
        let repo = fixtures::seeded_service();
        let info = table_info(&repo, Domain::Procurement).await;
        assert!(
            info.sample_rows
                .iter()
                .any(|row| row["actual_delivery_date"].is_null())
        );
    }

    #[tokio::test]
    async fn test_table_info_degraded() {
        let repo = fixtures::bare_service();
        let info = table_info(&repo, Domain::Finance).await;
        assert!(info.degraded);
        assert!(info.sample_rows.is_empty());
        assert!(info.error.is_some());
        assert_eq!(info.schema.len(), 6);
    }

    #[tokio::test]
    async fn test_filter_options_from_database() {
        let repo = fixtures::seeded_service();
        let options = filter_options(&repo, Domain::Sales, &BTreeMap::new()).await;
        assert_eq!(options.source, OptionSource::Database);
        assert!(!options.degraded);
        assert_eq!(
            options.values("regions"),
            Some(&["DACH".to_string(), "Nordics".to_string(), "UK".to_string()][..])
        );
        let coverage = options.coverage.unwrap();
        assert_eq!(coverage.min.as_deref(), Some("2025-01-05"));
        assert_eq!(coverage.max.as_deref(), Some("2025-03-01"));
    }

    #[tokio::test]
    async fn test_filter_options_finance_periods() {
        let repo = fixtures::seeded_service();
        let options = filter_options(&repo, Domain::Finance, &BTreeMap::new()).await;
        assert_eq!(
            options.values("periods").map(|v| v.len()),
            Some(3)
        );
        assert_eq!(options.values("cost_centers").map(|v| v.len()), Some(3));
    }

    #[tokio::test]
    async fn test_filter_options_static_fallback() {
        let repo = fixtures::bare_service();
        let mut statics = BTreeMap::new();
        statics.insert(
            Domain::Sales,
            BTreeMap::from([("regions".to_string(), vec!["DACH".to_string()])]),
        );

        let options = filter_options(&repo, Domain::Sales, &statics).await;
        assert!(options.degraded);
        assert_eq!(options.source, OptionSource::Static);
        assert_eq!(options.values("regions"), Some(&["DACH".to_string()][..]));
        assert_eq!(options.values("channels"), Some(&[][..]));
        assert!(options.coverage.is_none());
        assert!(options.error.is_some());
    }

    #[tokio::test]
    async fn test_filter_options_empty_fallback() {
        let repo = fixtures::bare_service();
        let options = filter_options(&repo, Domain::Procurement, &BTreeMap::new()).await;
        assert!(options.degraded);
        assert_eq!(options.source, OptionSource::None);
        assert_eq!(options.options.len(), 3);
        assert!(options.options.iter().all(|o| o.values.is_empty()));
    }

    #[tokio::test]
    async fn test_database_status() {
        let repo = fixtures::seeded_service();
        assert!(database_status(&repo).await.connected);
        repo.close().await;
        let status = database_status(&repo).await;
        assert!(!status.connected);
        assert!(status.error.is_some());
    }
}
