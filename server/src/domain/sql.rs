//! WHERE clause generation
//!
//! A `FilterSet` becomes an ordered list of predicates plus the values bound
//! to them. The same predicate list renders three ways:
//! - `named()`: `:name` placeholders, the canonical fragment
//! - `positional()`: dialect placeholders with a flat argument list, for execution
//! - `literal()`: quoted literals, for display only

use chrono::NaiveDate;
use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;

use super::catalog::{Domain, FieldKind};
use super::error::DomainError;
use super::filters::{FieldValue, FilterSet};
use crate::data::SqlValue;
use crate::data::sql::SqlDialect;
use crate::utils::sql::{quote_list, quote_literal};

/// Comparison operator of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Gte,
    Lte,
    In,
}

impl Op {
    fn as_sql(&self) -> &'static str {
        match self {
            Op::Gte => ">=",
            Op::Lte => "<=",
            Op::In => "IN",
        }
    }
}

/// A single `column op :param` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub op: Op,
    pub param: &'static str,
}

/// Value bound to a named parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BindValue {
    Date(NaiveDate),
    /// Period bounds (`YYYY-MM`)
    Text(String),
    List(Vec<String>),
}

impl BindValue {
    fn literal(&self) -> String {
        match self {
            BindValue::Date(d) => quote_literal(&d.format("%Y-%m-%d").to_string()),
            BindValue::Text(s) => quote_literal(s),
            BindValue::List(values) => quote_list(values),
        }
    }
}

/// Ordered parameter name -> value map (serializes as a JSON object)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindMap(Vec<(&'static str, BindValue)>);

impl BindMap {
    pub fn get(&self, name: &str) -> Option<&BindValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &BindValue)> {
        self.0.iter().map(|(n, v)| (*n, v))
    }
}

impl Serialize for BindMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// AND-joined predicates with their bound values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
    binds: BindMap,
}

impl WhereClause {
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn bind_map(&self) -> &BindMap {
        &self.binds
    }

    fn bound(&self, predicate: &Predicate) -> Option<&BindValue> {
        self.binds.get(predicate.param)
    }

    fn render(&self, mut rhs: impl FnMut(&Predicate) -> String) -> String {
        if self.predicates.is_empty() {
            return "1=1".to_string();
        }
        self.predicates
            .iter()
            .map(|p| format!("{} {} {}", p.column, p.op.as_sql(), rhs(p)))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Fragment with `:name` placeholders
    pub fn named(&self) -> String {
        self.render(|p| format!(":{}", p.param))
    }

    /// Fragment with dialect placeholders, numbered from `start`, plus the
    /// arguments in placeholder order. Lists expand to one placeholder each.
    pub fn positional(&self, dialect: &dyn SqlDialect, start: usize) -> (String, Vec<SqlValue>) {
        let mut args = Vec::new();
        let sql = self.render(|p| match self.bound(p) {
            Some(BindValue::List(values)) => {
                let slots: Vec<String> = values
                    .iter()
                    .map(|v| {
                        args.push(SqlValue::Text(v.clone()));
                        dialect.placeholder(start + args.len() - 1)
                    })
                    .collect();
                format!("({})", slots.join(", "))
            }
            Some(BindValue::Date(d)) => {
                args.push(SqlValue::Date(*d));
                dialect.placeholder(start + args.len() - 1)
            }
            Some(BindValue::Text(s)) => {
                args.push(SqlValue::Text(s.clone()));
                dialect.placeholder(start + args.len() - 1)
            }
            None => "NULL".to_string(),
        });
        (sql, args)
    }

    /// Fragment with inlined, quoted literals (display only)
    pub fn literal(&self) -> String {
        self.render(|p| {
            self.bound(p)
                .map(BindValue::literal)
                .unwrap_or_else(|| "NULL".to_string())
        })
    }
}

/// Translate a filter set into its WHERE clause
///
/// Predicates follow the domain's declared field order; absent bounds and
/// empty lists contribute nothing.
pub fn build_where(filters: &FilterSet) -> WhereClause {
    let mut clause = WhereClause::default();
    for (field, value) in filters.active_fields() {
        let op = match field.kind {
            FieldKind::DateFrom | FieldKind::PeriodFrom => Op::Gte,
            FieldKind::DateTo | FieldKind::PeriodTo => Op::Lte,
            FieldKind::MultiSelect => Op::In,
        };
        let bind = match value {
            FieldValue::Date(d) => BindValue::Date(d),
            FieldValue::Period(p) => BindValue::Text(p.to_string()),
            FieldValue::List(values) => BindValue::List(values.to_vec()),
        };
        clause.predicates.push(Predicate {
            column: field.column,
            op,
            param: field.name,
        });
        clause.binds.0.push((field.name, bind));
    }
    clause
}

/// Parse a domain tag and raw filters, then build the WHERE clause
pub fn generate_where(tag: &str, raw: &Value) -> Result<WhereClause, DomainError> {
    let domain = Domain::parse(tag)?;
    let filters = FilterSet::from_json(domain, raw)?;
    Ok(build_where(&filters))
}
