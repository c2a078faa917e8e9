//! Database status and coverage types

use serde::Serialize;

use crate::data::sql::Backend;

/// Connection status of the fact database
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub connected: bool,
    pub backend: Backend,
    pub database: Option<String>,
    pub server_version: Option<String>,
    pub error: Option<String>,
}

impl DatabaseStatus {
    pub fn connected(backend: Backend, database: String, server_version: String) -> Self {
        Self {
            connected: true,
            backend,
            database: Some(database),
            server_version: Some(server_version),
            error: None,
        }
    }

    pub fn disconnected(backend: Backend, error: impl Into<String>) -> Self {
        Self {
            connected: false,
            backend,
            database: None,
            server_version: None,
            error: Some(error.into()),
        }
    }
}

/// Earliest and latest value of a date or period column, as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub min: Option<String>,
    pub max: Option<String>,
}
