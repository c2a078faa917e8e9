//! Dashboard domain logic
//!
//! - `catalog` - The three domains and their fact table declarations
//! - `filters` - Typed filter sets and the validating factory
//! - `sql` - WHERE clause generation (parameterized and display forms)
//! - `queries` - KPI, trend and breakdown query shapes, SQL preview
//! - `executor` - Runs the three queries and assembles results
//! - `run` - Run records, lifecycle and results
//! - `store` - Per-session run history
//! - `session` - Sessions and the session registry
//! - `inspect` - Table info, filter options and database status

pub mod catalog;
pub mod error;
pub mod executor;
pub mod filters;
pub mod inspect;
pub mod queries;
pub mod run;
pub mod session;
pub mod sql;
pub mod store;

pub use catalog::{Column, Domain, FieldKind, FilterField};
pub use error::{DomainError, QueryKind, RunError};
pub use executor::{Execution, execute};
pub use filters::{FilterSet, Period};
pub use inspect::{FilterOptions, OptionList, OptionSource, TableInfo};
pub use queries::{preview_for, preview_sql};
pub use run::{Breakdown, Kpis, Run, RunResult, RunStatus, Trend, TrendSeries};
pub use session::{Session, SessionRegistry, SharedSession};
pub use sql::{BindMap, BindValue, WhereClause, build_where, generate_where};
pub use store::RunStore;
