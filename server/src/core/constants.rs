// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "DataPortal";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "dataportal";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".dataportal";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "dataportal.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "DATAPORTAL_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "DATAPORTAL_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "DATAPORTAL_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "DATAPORTAL_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8501;

/// Default request body limit (filter payloads are small)
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024;

/// Graceful shutdown timeout for background tasks
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Environment Variables - Database
// =============================================================================

/// Connection string for the fact-table database (required)
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Maximum pool size override
pub const ENV_DB_MAX_CONNECTIONS: &str = "DATAPORTAL_DB_MAX_CONNECTIONS";

/// KPI failure policy override (`fail` or `degrade`)
pub const ENV_KPI_FAILURE_POLICY: &str = "DATAPORTAL_KPI_FAILURE_POLICY";

/// Session idle timeout override (seconds)
pub const ENV_SESSION_IDLE_SECS: &str = "DATAPORTAL_SESSION_IDLE_SECS";

// =============================================================================
// PostgreSQL
// =============================================================================

/// URL schemes that select the PostgreSQL backend
pub const POSTGRES_URL_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

/// Default maximum pool size
pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default number of connections kept warm
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Default connection acquire timeout in seconds
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Default idle connection timeout in seconds
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default statement timeout in seconds (0 disables)
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;

/// Health check interval for the pool
pub const POSTGRES_HEALTH_CHECK_INTERVAL_SECS: u64 = 60;

// =============================================================================
// DuckDB
// =============================================================================

/// URL prefix that selects the DuckDB backend
pub const DUCKDB_URL_PREFIX: &str = "duckdb://";

/// Connection string for an in-memory DuckDB database
pub const DUCKDB_MEMORY_URL: &str = "duckdb::memory:";

/// DuckDB query timeout in seconds
pub const DUCKDB_QUERY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Query Limits
// =============================================================================

/// Breakdown results keep the top N groups
pub const QUERY_BREAKDOWN_LIMIT: usize = 10;

/// Rows returned by the table sample
pub const QUERY_SAMPLE_ROWS: u32 = 5;

// =============================================================================
// Sessions
// =============================================================================

/// Request header carrying the session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Default idle time before a session is discarded (2 hours)
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 7200;

/// Default maximum number of live sessions
pub const DEFAULT_MAX_SESSIONS: u64 = 1000;
