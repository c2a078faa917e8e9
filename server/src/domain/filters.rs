//! Filter contract
//!
//! One typed filter struct per domain, wrapped in the `FilterSet` tagged
//! union. `FilterSet::from_json` is the only way to build a set from raw
//! input; it rejects unknown fields, malformed values and inverted ranges.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::catalog::{Domain, FieldKind, FilterField};
use super::error::DomainError;
use super::inspect::FilterOptions;

/// A calendar month in `YYYY-MM` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (1..=9999).contains(&year)).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("expected YYYY-MM, got '{}'", s);
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Closed date range with optional bounds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Closed period range with optional bounds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodRange {
    pub from: Option<Period>,
    pub to: Option<Period>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilters {
    pub dates: DateRange,
    pub regions: Vec<String>,
    pub product_categories: Vec<String>,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcurementFilters {
    pub dates: DateRange,
    pub suppliers: Vec<String>,
    pub material_groups: Vec<String>,
    pub plants: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinanceFilters {
    pub periods: PeriodRange,
    pub company_codes: Vec<String>,
    pub cost_centers: Vec<String>,
    pub accounts: Vec<String>,
}

/// Validated, domain-typed filter values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSet {
    Sales(SalesFilters),
    Procurement(ProcurementFilters),
    Finance(FinanceFilters),
}

/// A present filter value, borrowed from its set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Date(NaiveDate),
    Period(Period),
    List(&'a [String]),
}

impl FieldValue<'_> {
    fn to_json(self) -> Value {
        match self {
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::Period(p) => Value::String(p.to_string()),
            FieldValue::List(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }

    fn display(self) -> String {
        match self {
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Period(p) => p.to_string(),
            FieldValue::List(values) => values.join(", "),
        }
    }
}

impl FilterSet {
    /// Build a filter set from raw JSON (the single validating factory)
    ///
    /// `null` means no filters. A field set to `null` is the same as an
    /// absent field; so is an empty string for a range bound.
    pub fn from_json(domain: Domain, value: &Value) -> Result<Self, DomainError> {
        let empty = Map::new();
        let obj = match value {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(DomainError::NotAnObject),
        };

        if let Some(unknown) = obj.keys().find(|k| domain.filter_field(k).is_none()) {
            return Err(DomainError::UnknownField {
                domain,
                field: unknown.clone(),
            });
        }

        let reader = FieldReader { obj };
        let set = match domain {
            Domain::Sales => FilterSet::Sales(SalesFilters {
                dates: reader.date_range("date_from", "date_to")?,
                regions: reader.list("regions")?,
                product_categories: reader.list("product_categories")?,
                channels: reader.list("channels")?,
            }),
            Domain::Procurement => FilterSet::Procurement(ProcurementFilters {
                dates: reader.date_range("date_from", "date_to")?,
                suppliers: reader.list("suppliers")?,
                material_groups: reader.list("material_groups")?,
                plants: reader.list("plants")?,
            }),
            Domain::Finance => FilterSet::Finance(FinanceFilters {
                periods: reader.period_range("period_from", "period_to")?,
                company_codes: reader.list("company_codes")?,
                cost_centers: reader.list("cost_centers")?,
                accounts: reader.list("accounts")?,
            }),
        };
        Ok(set)
    }

    /// Filter set with no active fields
    pub fn empty(domain: Domain) -> Self {
        match domain {
            Domain::Sales => FilterSet::Sales(SalesFilters::default()),
            Domain::Procurement => FilterSet::Procurement(ProcurementFilters::default()),
            Domain::Finance => FilterSet::Finance(FinanceFilters::default()),
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            FilterSet::Sales(_) => Domain::Sales,
            FilterSet::Procurement(_) => Domain::Procurement,
            FilterSet::Finance(_) => Domain::Finance,
        }
    }

    /// Value of a declared field, if present (empty lists are absent)
    pub fn value<'a>(&'a self, name: &str) -> Option<FieldValue<'a>> {
        let list = |values: &'a [String]| -> Option<FieldValue<'a>> {
            (!values.is_empty()).then_some(FieldValue::List(values))
        };
        match self {
            FilterSet::Sales(f) => match name {
                "date_from" => f.dates.from.map(FieldValue::Date),
                "date_to" => f.dates.to.map(FieldValue::Date),
                "regions" => list(&f.regions),
                "product_categories" => list(&f.product_categories),
                "channels" => list(&f.channels),
                _ => None,
            },
            FilterSet::Procurement(f) => match name {
                "date_from" => f.dates.from.map(FieldValue::Date),
                "date_to" => f.dates.to.map(FieldValue::Date),
                "suppliers" => list(&f.suppliers),
                "material_groups" => list(&f.material_groups),
                "plants" => list(&f.plants),
                _ => None,
            },
            FilterSet::Finance(f) => match name {
                "period_from" => f.periods.from.map(FieldValue::Period),
                "period_to" => f.periods.to.map(FieldValue::Period),
                "company_codes" => list(&f.company_codes),
                "cost_centers" => list(&f.cost_centers),
                "accounts" => list(&f.accounts),
                _ => None,
            },
        }
    }

    /// Present fields in declared order
    pub fn active_fields(&self) -> Vec<(&'static FilterField, FieldValue<'_>)> {
        self.domain()
            .filter_fields()
            .iter()
            .filter_map(|field| self.value(field.name).map(|v| (field, v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active_fields().is_empty()
    }

    /// Whether any multi-select field carries values
    pub fn has_selections(&self) -> bool {
        self.active_fields()
            .iter()
            .any(|(_, value)| matches!(value, FieldValue::List(_)))
    }

    /// Serialized form stored on a run (present fields only)
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .active_fields()
            .into_iter()
            .map(|(field, value)| (field.name.to_string(), value.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Human-readable summary, e.g. `2025-01-01 to 2025-01-31 | Region: DACH`
    pub fn summary(&self) -> String {
        let active = self.active_fields();
        let bound = |pred: fn(&FieldKind) -> bool| {
            active
                .iter()
                .find(|(f, _)| pred(&f.kind))
                .map(|(_, v)| v.display())
        };

        let mut parts = Vec::new();
        match (bound(FieldKind::is_lower_bound), bound(FieldKind::is_upper_bound)) {
            (Some(from), Some(to)) => parts.push(format!("{} to {}", from, to)),
            (Some(from), None) => parts.push(format!("From {}", from)),
            (None, Some(to)) => parts.push(format!("Until {}", to)),
            (None, None) => {}
        }
        for (field, value) in &active {
            if field.kind == FieldKind::MultiSelect {
                parts.push(format!("{}: {}", field.label, value.display()));
            }
        }

        if parts.is_empty() {
            "No filters".to_string()
        } else {
            parts.join(" | ")
        }
    }

    /// Check multi-select values against the option source
    ///
    /// Skipped when the options are degraded or a field has no option list.
    pub fn check_options(&self, options: &FilterOptions) -> Result<(), DomainError> {
        if options.degraded {
            return Ok(());
        }
        for (field, value) in self.active_fields() {
            let FieldValue::List(values) = value else {
                continue;
            };
            let Some(allowed) = options.values(field.name) else {
                continue;
            };
            if let Some(unknown) = values.iter().find(|v| !allowed.contains(*v)) {
                return Err(DomainError::UnknownOption {
                    field: field.name.to_string(),
                    value: unknown.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Typed access to the raw JSON object
struct FieldReader<'a> {
    obj: &'a Map<String, Value>,
}

impl FieldReader<'_> {
    fn scalar(&self, name: &str) -> Result<Option<&str>, DomainError> {
        match self.obj.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim())),
            Some(_) => Err(DomainError::invalid_value(name, "expected a string")),
        }
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDate>, DomainError> {
        self.scalar(name)?
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                    DomainError::invalid_value(name, format!("expected YYYY-MM-DD, got '{}'", s))
                })
            })
            .transpose()
    }

    fn period(&self, name: &str) -> Result<Option<Period>, DomainError> {
        self.scalar(name)?
            .map(|s| s.parse().map_err(|e: String| DomainError::invalid_value(name, e)))
            .transpose()
    }

    fn date_range(
        &self,
        from_field: &'static str,
        to_field: &'static str,
    ) -> Result<DateRange, DomainError> {
        let range = DateRange {
            from: self.date(from_field)?,
            to: self.date(to_field)?,
        };
        if let (Some(from), Some(to)) = (range.from, range.to)
            && from > to
        {
            return Err(DomainError::InvertedRange {
                from_field,
                to_field,
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(range)
    }

    fn period_range(
        &self,
        from_field: &'static str,
        to_field: &'static str,
    ) -> Result<PeriodRange, DomainError> {
        let range = PeriodRange {
            from: self.period(from_field)?,
            to: self.period(to_field)?,
        };
        if let (Some(from), Some(to)) = (range.from, range.to)
            && from > to
        {
            return Err(DomainError::InvertedRange {
                from_field,
                to_field,
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(range)
    }

    /// Multi-select values: order kept, duplicates dropped, blanks rejected
    fn list(&self, name: &str) -> Result<Vec<String>, DomainError> {
        let items = match self.obj.get(name) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(DomainError::invalid_value(
                    name,
                    "expected an array of strings",
                ));
            }
        };

        let mut values: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            let Value::String(s) = item else {
                return Err(DomainError::invalid_value(
                    name,
                    "expected an array of strings",
                ));
            };
            if s.trim().is_empty() {
                return Err(DomainError::invalid_value(name, "blank value"));
            }
            if !values.contains(s) {
                values.push(s.clone());
            }
        }
        Ok(values)
    }
}
