//! Domain catalog
//!
//! The three analytical domains, each bound to exactly one fact table with a
//! fixed column schema, filter field declarations and breakdown dimension.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;

use super::error::DomainError;

/// Analytical domain
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Sales,
    Procurement,
    Finance,
}

/// A fact table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub data_type: &'static str,
    pub description: &'static str,
}

/// How a filter field constrains its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Lower bound of a `YYYY-MM-DD` date range
    DateFrom,
    /// Upper bound of a `YYYY-MM-DD` date range
    DateTo,
    /// Lower bound of a `YYYY-MM` period range
    PeriodFrom,
    /// Upper bound of a `YYYY-MM` period range
    PeriodTo,
    /// Zero or more allowed values
    MultiSelect,
}

impl FieldKind {
    pub fn is_lower_bound(&self) -> bool {
        matches!(self, FieldKind::DateFrom | FieldKind::PeriodFrom)
    }

    pub fn is_upper_bound(&self) -> bool {
        matches!(self, FieldKind::DateTo | FieldKind::PeriodTo)
    }
}

/// A declared filter field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    /// Display label used in filter summaries
    pub label: &'static str,
}

const fn col(name: &'static str, data_type: &'static str, description: &'static str) -> Column {
    Column {
        name,
        data_type,
        description,
    }
}

const fn field(
    name: &'static str,
    column: &'static str,
    kind: FieldKind,
    label: &'static str,
) -> FilterField {
    FilterField {
        name,
        column,
        kind,
        label,
    }
}

const SALES_SCHEMA: &[Column] = &[
    col("order_date", "DATE", "Order date"),
    col("region", "VARCHAR", "Sales region"),
    col("product_category", "VARCHAR", "Product category"),
    col("channel", "VARCHAR", "Sales channel"),
    col("revenue", "DECIMAL", "Order revenue"),
    col("visitor_id", "VARCHAR", "Visitor identifier"),
];

const PROCUREMENT_SCHEMA: &[Column] = &[
    col("purchase_date", "DATE", "Purchase date"),
    col("supplier", "VARCHAR", "Supplier name"),
    col("material_group", "VARCHAR", "Material group"),
    col("plant", "VARCHAR", "Plant code"),
    col("spend", "DECIMAL", "Purchase spend"),
    col("requested_delivery_date", "DATE", "Requested delivery date"),
    col("actual_delivery_date", "DATE", "Actual delivery date"),
];

const FINANCE_SCHEMA: &[Column] = &[
    col("posting_period", "VARCHAR", "Posting period (YYYY-MM)"),
    col("company_code", "VARCHAR", "Company code"),
    col("cost_center", "VARCHAR", "Cost center"),
    col("account", "VARCHAR", "GL account"),
    col("account_type", "VARCHAR", "Account type (revenue/expense)"),
    col("amount", "DECIMAL", "Posting amount"),
];

const SALES_FIELDS: &[FilterField] = &[
    field("date_from", "order_date", FieldKind::DateFrom, "Date"),
    field("date_to", "order_date", FieldKind::DateTo, "Date"),
    field("regions", "region", FieldKind::MultiSelect, "Region"),
    field(
        "product_categories",
        "product_category",
        FieldKind::MultiSelect,
        "Category",
    ),
    field("channels", "channel", FieldKind::MultiSelect, "Channel"),
];

const PROCUREMENT_FIELDS: &[FilterField] = &[
    field("date_from", "purchase_date", FieldKind::DateFrom, "Date"),
    field("date_to", "purchase_date", FieldKind::DateTo, "Date"),
    field("suppliers", "supplier", FieldKind::MultiSelect, "Supplier"),
    field(
        "material_groups",
        "material_group",
        FieldKind::MultiSelect,
        "Material",
    ),
    field("plants", "plant", FieldKind::MultiSelect, "Plant"),
];

const FINANCE_FIELDS: &[FilterField] = &[
    field("period_from", "posting_period", FieldKind::PeriodFrom, "Period"),
    field("period_to", "posting_period", FieldKind::PeriodTo, "Period"),
    field(
        "company_codes",
        "company_code",
        FieldKind::MultiSelect,
        "Company",
    ),
    field(
        "cost_centers",
        "cost_center",
        FieldKind::MultiSelect,
        "Cost Center",
    ),
    field("accounts", "account", FieldKind::MultiSelect, "Account"),
];

impl Domain {
    const ALL: [Domain; 3] = [Domain::Sales, Domain::Procurement, Domain::Finance];

    /// All domains in declaration order
    pub fn all() -> &'static [Domain] {
        &Self::ALL
    }

    /// Parse a domain tag (case-insensitive)
    pub fn parse(tag: &str) -> Result<Self, DomainError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "sales" => Ok(Domain::Sales),
            "procurement" => Ok(Domain::Procurement),
            "finance" => Ok(Domain::Finance),
            _ => Err(DomainError::UnknownDomain(tag.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Domain::Sales => "sales",
            Domain::Procurement => "procurement",
            Domain::Finance => "finance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Sales => "Sales",
            Domain::Procurement => "Procurement",
            Domain::Finance => "Finance",
        }
    }

    /// Fact table this domain reads from
    pub fn table(&self) -> &'static str {
        match self {
            Domain::Sales => "mart.sales_orders_fact",
            Domain::Procurement => "mart.procurement_orders_fact",
            Domain::Finance => "mart.gl_postings_fact",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Domain::Sales => "Aggregated sales order data",
            Domain::Procurement => "Aggregated procurement order data",
            Domain::Finance => "Aggregated general ledger posting data",
        }
    }

    pub fn schema(&self) -> &'static [Column] {
        match self {
            Domain::Sales => SALES_SCHEMA,
            Domain::Procurement => PROCUREMENT_SCHEMA,
            Domain::Finance => FINANCE_SCHEMA,
        }
    }

    /// Filter fields in declared order (this order drives predicate order)
    pub fn filter_fields(&self) -> &'static [FilterField] {
        match self {
            Domain::Sales => SALES_FIELDS,
            Domain::Procurement => PROCUREMENT_FIELDS,
            Domain::Finance => FINANCE_FIELDS,
        }
    }

    pub fn filter_field(&self, name: &str) -> Option<&'static FilterField> {
        self.filter_fields().iter().find(|f| f.name == name)
    }

    /// Option lists offered for this domain: (option field, column)
    ///
    /// Every multi-select field, plus `periods` for finance (listing only).
    pub fn filter_option_columns(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Domain::Sales => &[
                ("regions", "region"),
                ("product_categories", "product_category"),
                ("channels", "channel"),
            ],
            Domain::Procurement => &[
                ("suppliers", "supplier"),
                ("material_groups", "material_group"),
                ("plants", "plant"),
            ],
            Domain::Finance => &[
                ("company_codes", "company_code"),
                ("cost_centers", "cost_center"),
                ("accounts", "account"),
                ("periods", "posting_period"),
            ],
        }
    }

    /// Column whose min/max describe the data coverage
    pub fn date_column(&self) -> &'static str {
        match self {
            Domain::Sales => "order_date",
            Domain::Procurement => "purchase_date",
            Domain::Finance => "posting_period",
        }
    }

    pub fn breakdown_dimension(&self) -> &'static str {
        match self {
            Domain::Sales => "region",
            Domain::Procurement => "material_group",
            Domain::Finance => "cost_center",
        }
    }

    /// KPI names in display order
    pub fn kpi_names(&self) -> &'static [&'static str] {
        match self {
            Domain::Sales => &[
                "total_revenue",
                "total_orders",
                "avg_order_value",
                "conversion_rate",
            ],
            Domain::Procurement => &[
                "total_spend",
                "purchase_orders",
                "avg_po_value",
                "on_time_delivery",
            ],
            Domain::Finance => &[
                "net_income",
                "operating_margin",
                "total_expenses",
                "posting_count",
            ],
        }
    }

    /// Names of the two trend series
    pub fn trend_series(&self) -> [&'static str; 2] {
        match self {
            Domain::Sales => ["revenue", "orders"],
            Domain::Procurement => ["spend", "orders"],
            Domain::Finance => ["income", "expenses"],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
