use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_MAX_SESSIONS, DEFAULT_PORT,
    DEFAULT_SESSION_IDLE_SECS, DUCKDB_MEMORY_URL, DUCKDB_URL_PREFIX,
    POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS, POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_MAX_CONNECTIONS, POSTGRES_DEFAULT_MIN_CONNECTIONS,
    POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS, POSTGRES_URL_SCHEMES,
};

// =============================================================================
// KPI Failure Policy
// =============================================================================

/// What happens to a run when its KPI query fails
///
/// Connectivity failures always fail the run regardless of policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiFailurePolicy {
    /// The run is marked failed
    #[default]
    Fail,
    /// KPIs default to zero and the run result is flagged as degraded
    Degrade,
}

impl fmt::Display for KpiFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiFailurePolicy::Fail => write!(f, "fail"),
            KpiFailurePolicy::Degrade => write!(f, "degrade"),
        }
    }
}

// =============================================================================
// Database Target
// =============================================================================

/// Database backend selected by the connection string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    Duckdb,
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseBackend::Postgres => write!(f, "postgres"),
            DatabaseBackend::Duckdb => write!(f, "duckdb"),
        }
    }
}

/// Parsed connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Postgres { url: String },
    /// `None` path means an in-memory database
    Duckdb { path: Option<PathBuf> },
}

impl DatabaseTarget {
    /// Parse a connection string into a backend target
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            anyhow::bail!("Configuration error: database URL must not be empty");
        }
        if POSTGRES_URL_SCHEMES.iter().any(|s| url.starts_with(s)) {
            return Ok(Self::Postgres {
                url: url.to_string(),
            });
        }
        if url == DUCKDB_MEMORY_URL {
            return Ok(Self::Duckdb { path: None });
        }
        if let Some(rest) = url.strip_prefix(DUCKDB_URL_PREFIX) {
            if rest.is_empty() || rest == ":memory:" {
                return Ok(Self::Duckdb { path: None });
            }
            return Ok(Self::Duckdb {
                path: Some(expand_path(rest)),
            });
        }
        anyhow::bail!(
            "Configuration error: unsupported database URL '{}'. \
             Use postgres://, postgresql://, duckdb://<path> or {}",
            redact_url(url),
            DUCKDB_MEMORY_URL
        )
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Postgres { .. } => DatabaseBackend::Postgres,
            Self::Duckdb { .. } => DatabaseBackend::Duckdb,
        }
    }

    /// Connection string safe for logs
    pub fn redacted(&self) -> String {
        match self {
            Self::Postgres { url } => redact_url(url),
            Self::Duckdb { path: None } => DUCKDB_MEMORY_URL.to_string(),
            Self::Duckdb { path: Some(p) } => format!("{}{}", DUCKDB_URL_PREFIX, p.display()),
        }
    }
}

/// Hide the user-info part (`user:password@`) of a URL
fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    match rest.rfind('@') {
        Some(at) => format!("{}***@{}", &url[..scheme_end + 3], &rest[at + 1..]),
        None => url.to_string(),
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Connection string (DATABASE_URL takes precedence)
    pub url: Option<String>,
    /// Maximum number of pooled connections (default: 5)
    pub max_connections: Option<u32>,
    /// Minimum number of connections kept warm (default: 1)
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 10)
    pub acquire_timeout_secs: Option<u64>,
    /// Idle connection timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Statement timeout in seconds, 0 to disable (default: 60)
    pub statement_timeout_secs: Option<u64>,
}

/// Session registry configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SessionsFileConfig {
    pub idle_timeout_secs: Option<u64>,
    pub max_sessions: Option<u64>,
}

/// Run execution configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RunsFileConfig {
    pub kpi_failure_policy: Option<KpiFailurePolicy>,
}

/// Static filter option lists keyed by domain tag, then option field name
pub type FilterOptionsFileConfig = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub sessions: Option<SessionsFileConfig>,
    pub runs: Option<RunsFileConfig>,
    pub filter_options: Option<FilterOptionsFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(db) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if db.url.is_some() {
                current.url = db.url;
            }
            if db.max_connections.is_some() {
                current.max_connections = db.max_connections;
            }
            if db.min_connections.is_some() {
                current.min_connections = db.min_connections;
            }
            if db.acquire_timeout_secs.is_some() {
                current.acquire_timeout_secs = db.acquire_timeout_secs;
            }
            if db.idle_timeout_secs.is_some() {
                current.idle_timeout_secs = db.idle_timeout_secs;
            }
            if db.statement_timeout_secs.is_some() {
                current.statement_timeout_secs = db.statement_timeout_secs;
            }
        }

        if let Some(sessions) = other.sessions {
            let current = self.sessions.get_or_insert_with(SessionsFileConfig::default);
            if sessions.idle_timeout_secs.is_some() {
                current.idle_timeout_secs = sessions.idle_timeout_secs;
            }
            if sessions.max_sessions.is_some() {
                current.max_sessions = sessions.max_sessions;
            }
        }

        if let Some(runs) = other.runs {
            let current = self.runs.get_or_insert_with(RunsFileConfig::default);
            if runs.kpi_failure_policy.is_some() {
                current.kpi_failure_policy = runs.kpi_failure_policy;
            }
        }

        // Option lists replace per domain and field
        if let Some(options) = other.filter_options {
            let current = self.filter_options.get_or_insert_with(BTreeMap::new);
            for (domain, fields) in options {
                current.entry(domain).or_default().extend(fields);
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs
// =============================================================================

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    /// Statement timeout in seconds (0 = disabled)
    pub statement_timeout_secs: u64,
}

/// Session registry configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    pub max_sessions: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_SESSION_IDLE_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// Run execution configuration
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub kpi_failure_policy: KpiFailurePolicy,
}

/// Static filter option lists used when the database cannot supply them
pub type StaticFilterOptions = BTreeMap<Domain, BTreeMap<String, Vec<String>>>;

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sessions: SessionConfig,
    pub runs: RunConfig,
    pub filter_options: StaticFilterOptions,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.dataportal/dataportal.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    ///
    /// A missing database URL is a fatal error.
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Self::from_layers(cli, file_config)
    }

    /// Layer defaults, file config and CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_sessions = file_config.sessions.unwrap_or_default();
        let file_runs = file_config.runs.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let url = cli.database_url.clone().or(file_database.url).context(
            "Configuration error: DATABASE_URL is not set. \
             Provide it via the environment, --database-url or database.url in the config file",
        )?;
        let target = DatabaseTarget::parse(&url)?;

        let database = DatabaseConfig {
            target,
            max_connections: cli
                .db_max_connections
                .or(file_database.max_connections)
                .unwrap_or(POSTGRES_DEFAULT_MAX_CONNECTIONS),
            min_connections: file_database
                .min_connections
                .unwrap_or(POSTGRES_DEFAULT_MIN_CONNECTIONS),
            acquire_timeout_secs: file_database
                .acquire_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout_secs: file_database
                .idle_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS),
            statement_timeout_secs: file_database
                .statement_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS),
        };

        let sessions = SessionConfig {
            idle_timeout_secs: cli
                .session_idle_secs
                .or(file_sessions.idle_timeout_secs)
                .unwrap_or(DEFAULT_SESSION_IDLE_SECS),
            max_sessions: file_sessions.max_sessions.unwrap_or(DEFAULT_MAX_SESSIONS),
        };

        let runs = RunConfig {
            kpi_failure_policy: cli
                .kpi_failure_policy
                .or(file_runs.kpi_failure_policy)
                .unwrap_or_default(),
        };

        let filter_options = parse_static_options(file_config.filter_options.unwrap_or_default())?;

        let config = Self {
            server: ServerConfig { host, port },
            database,
            sessions,
            runs,
            filter_options,
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            backend = %config.database.target.backend(),
            database = %config.database.target.redacted(),
            max_connections = config.database.max_connections,
            session_idle_secs = config.sessions.idle_timeout_secs,
            kpi_failure_policy = %config.runs.kpi_failure_policy,
            static_option_domains = config.filter_options.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("Configuration error: database.max_connections must be greater than 0");
        }
        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Configuration error: database.min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }
        if self.sessions.idle_timeout_secs == 0 {
            anyhow::bail!("Configuration error: sessions.idle_timeout_secs must be greater than 0");
        }
        if self.sessions.max_sessions == 0 {
            anyhow::bail!("Configuration error: sessions.max_sessions must be greater than 0");
        }
        Ok(())
    }
}

/// Resolve domain tags and option field names of the static lists
fn parse_static_options(raw: FilterOptionsFileConfig) -> Result<StaticFilterOptions> {
    let mut parsed = StaticFilterOptions::new();
    for (tag, fields) in raw {
        let domain: Domain = tag
            .parse()
            .with_context(|| format!("Configuration error: filter_options.{}", tag))?;
        let known = domain.filter_option_columns();
        for field in fields.keys() {
            if !known.iter().any(|(name, _)| name == field) {
                anyhow::bail!(
                    "Configuration error: filter_options.{}.{} is not an option field of {}",
                    tag,
                    field,
                    domain
                );
            }
        }
        parsed.insert(domain, fields);
    }
    Ok(parsed)
}

/// Get the profile config path (~/.dataportal/dataportal.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_url(url: &str) -> CliConfig {
        CliConfig {
            database_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_database_target_parse_postgres() {
        let target = DatabaseTarget::parse("postgresql://u:p@localhost:5432/dataportal").unwrap();
        assert_eq!(target.backend(), DatabaseBackend::Postgres);
        assert_eq!(target.redacted(), "postgresql://***@localhost:5432/dataportal");
    }

    #[test]
    fn test_database_target_parse_duckdb() {
        assert_eq!(
            DatabaseTarget::parse("duckdb::memory:").unwrap(),
            DatabaseTarget::Duckdb { path: None }
        );
        assert_eq!(
            DatabaseTarget::parse("duckdb://:memory:").unwrap(),
            DatabaseTarget::Duckdb { path: None }
        );
        assert_eq!(
            DatabaseTarget::parse("duckdb:///tmp/mart.duckdb").unwrap(),
            DatabaseTarget::Duckdb {
                path: Some(PathBuf::from("/tmp/mart.duckdb"))
            }
        );
    }

    #[test]
    fn test_database_target_parse_rejects_unknown_scheme() {
        let err = DatabaseTarget::parse("mysql://root:secret@db/mart").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unsupported database URL"));
        assert!(!msg.contains("secret"));
    }

    #[test]
    fn test_redact_url_without_credentials() {
        assert_eq!(redact_url("postgres://localhost/db"), "postgres://localhost/db");
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "database": { "url": "duckdb::memory:", "max_connections": 8 },
            "sessions": { "idle_timeout_secs": 60 },
            "runs": { "kpi_failure_policy": "degrade" },
            "filter_options": { "sales": { "regions": ["DACH", "UK"] } }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(
            config.database.as_ref().unwrap().url.as_deref(),
            Some("duckdb::memory:")
        );
        assert_eq!(
            config.runs.as_ref().unwrap().kpi_failure_policy,
            Some(KpiFailurePolicy::Degrade)
        );
        assert_eq!(
            config.filter_options.as_ref().unwrap()["sales"]["regions"],
            vec!["DACH", "UK"]
        );
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "base.host", "port": 1000 },
                "database": { "url": "duckdb::memory:", "max_connections": 3 },
                "filter_options": { "sales": { "regions": ["DACH"], "channels": ["Online"] } }
            }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{
                "server": { "port": 2000 },
                "database": { "max_connections": 9 },
                "filter_options": { "sales": { "regions": ["UK"] } }
            }"#,
        )
        .unwrap();

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("base.host"));
        assert_eq!(server.port, Some(2000));
        let db = base.database.unwrap();
        assert_eq!(db.url.as_deref(), Some("duckdb::memory:"));
        assert_eq!(db.max_connections, Some(9));
        let sales = &base.filter_options.unwrap()["sales"];
        assert_eq!(sales["regions"], vec!["UK"]);
        assert_eq!(sales["channels"], vec!["Online"]);
    }

    #[test]
    fn test_app_config_defaults() {
        let config =
            AppConfig::from_layers(&cli_with_url("duckdb::memory:"), FileConfig::default())
                .unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.database.target, DatabaseTarget::Duckdb { path: None });
        assert_eq!(
            config.database.max_connections,
            POSTGRES_DEFAULT_MAX_CONNECTIONS
        );
        assert_eq!(config.runs.kpi_failure_policy, KpiFailurePolicy::Fail);
        assert!(config.filter_options.is_empty());
    }

    #[test]
    fn test_app_config_missing_database_url_is_fatal() {
        let err = AppConfig::from_layers(&CliConfig::default(), FileConfig::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("DATABASE_URL"));
    }

    #[test]
    fn test_app_config_cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "file.host", "port": 1000 },
                "database": { "url": "postgres://file/db", "max_connections": 3 },
                "runs": { "kpi_failure_policy": "fail" }
            }"#,
        )
        .unwrap();
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            database_url: Some("duckdb::memory:".to_string()),
            db_max_connections: Some(7),
            kpi_failure_policy: Some(KpiFailurePolicy::Degrade),
            session_idle_secs: Some(30),
            config: None,
        };

        let config = AppConfig::from_layers(&cli, file).unwrap();

        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.target.backend(), DatabaseBackend::Duckdb);
        assert_eq!(config.database.max_connections, 7);
        assert_eq!(config.runs.kpi_failure_policy, KpiFailurePolicy::Degrade);
        assert_eq!(config.sessions.idle_timeout_secs, 30);
    }

    #[test]
    fn test_app_config_validation_pool_bounds() {
        let file: FileConfig =
            serde_json::from_str(r#"{ "database": { "min_connections": 9, "max_connections": 2 } }"#)
                .unwrap();
        let err = AppConfig::from_layers(&cli_with_url("duckdb::memory:"), file)
            .unwrap_err()
            .to_string();
        assert!(err.contains("min_connections"));
    }

    #[test]
    fn test_app_config_validation_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..cli_with_url("duckdb::memory:")
        };
        let err = AppConfig::from_layers(&cli, FileConfig::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("server.port"));
    }

    #[test]
    fn test_static_options_unknown_field_rejected() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "filter_options": { "finance": { "regions": ["DACH"] } } }"#,
        )
        .unwrap();
        let err = AppConfig::from_layers(&cli_with_url("duckdb::memory:"), file)
            .unwrap_err()
            .to_string();
        assert!(err.contains("filter_options.finance.regions"));
    }

    #[test]
    fn test_static_options_unknown_domain_rejected() {
        let file: FileConfig =
            serde_json::from_str(r#"{ "filter_options": { "hr": { "teams": ["A"] } } }"#).unwrap();
        assert!(AppConfig::from_layers(&cli_with_url("duckdb::memory:"), file).is_err());
    }

    #[test]
    fn test_app_config_load_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(
            &path,
            r#"{ "database": { "url": "duckdb::memory:" }, "server": { "port": 9100 } }"#,
        )
        .unwrap();
        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.target, DatabaseTarget::Duckdb { path: None });
    }

    #[test]
    fn test_app_config_load_missing_config_file() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/dataportal.json")),
            ..cli_with_url("duckdb::memory:")
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
