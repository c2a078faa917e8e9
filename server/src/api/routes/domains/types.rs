//! Domain API types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{BindMap, Domain, FieldKind, FilterField};

/// Declared filter field
#[derive(Debug, Serialize, ToSchema)]
pub struct FilterFieldDto {
    pub name: String,
    pub column: String,
    pub kind: FieldKind,
    pub label: String,
}

impl From<&FilterField> for FilterFieldDto {
    fn from(field: &FilterField) -> Self {
        Self {
            name: field.name.to_string(),
            column: field.column.to_string(),
            kind: field.kind,
            label: field.label.to_string(),
        }
    }
}

/// Domain summary for the catalog listing
#[derive(Debug, Serialize, ToSchema)]
pub struct DomainSummaryDto {
    pub domain: Domain,
    pub label: String,
    pub table: String,
    pub description: String,
    pub breakdown_dimension: String,
    pub kpis: Vec<String>,
    pub filter_fields: Vec<FilterFieldDto>,
}

impl From<Domain> for DomainSummaryDto {
    fn from(domain: Domain) -> Self {
        Self {
            domain,
            label: domain.label().to_string(),
            table: domain.table().to_string(),
            description: domain.description().to_string(),
            breakdown_dimension: domain.breakdown_dimension().to_string(),
            kpis: domain.kpi_names().iter().map(|k| k.to_string()).collect(),
            filter_fields: domain.filter_fields().iter().map(Into::into).collect(),
        }
    }
}

/// Request body for rendering a filter preview
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PreviewRequest {
    /// Raw filter object for the domain (null or absent means no filters)
    #[serde(default)]
    #[schema(value_type = Object)]
    pub filters: Value,
}

/// Rendered WHERE clause and SQL preview for a filter set
#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewResponse {
    pub domain: Domain,
    /// Parameterized fragment with `:name` placeholders
    #[serde(rename = "where")]
    pub where_clause: String,
    #[schema(value_type = Object)]
    pub binds: BindMap,
    /// KPI query with literal values inlined
    pub sql: String,
    pub summary: String,
}
