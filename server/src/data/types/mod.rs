//! Shared data types for both fact database backends

mod query;
mod status;

pub use query::{GroupRow, SqlValue, Statement};
pub use status::{Coverage, DatabaseStatus};
