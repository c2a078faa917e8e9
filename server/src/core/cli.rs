use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::KpiFailurePolicy;
use super::constants::{
    ENV_CONFIG, ENV_DATABASE_URL, ENV_DB_MAX_CONNECTIONS, ENV_HOST, ENV_KPI_FAILURE_POLICY,
    ENV_PORT, ENV_SESSION_IDLE_SECS,
};

#[derive(Parser)]
#[command(name = "dataportal")]
#[command(version, about = "Read-only analytical dashboard service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Fact database connection string (postgres://..., duckdb://path, duckdb::memory:)
    #[arg(long, global = true, env = ENV_DATABASE_URL, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections
    #[arg(long, global = true, env = ENV_DB_MAX_CONNECTIONS)]
    pub db_max_connections: Option<u32>,

    /// What a failed KPI query does to a run (fail or degrade)
    #[arg(long, global = true, env = ENV_KPI_FAILURE_POLICY, value_parser = parse_kpi_failure_policy)]
    pub kpi_failure_policy: Option<KpiFailurePolicy>,

    /// Idle seconds before a session is discarded
    #[arg(long, global = true, env = ENV_SESSION_IDLE_SECS)]
    pub session_idle_secs: Option<u64>,
}

/// Parse KPI failure policy from CLI/env string
fn parse_kpi_failure_policy(s: &str) -> Result<KpiFailurePolicy, String> {
    match s.to_lowercase().as_str() {
        "fail" => Ok(KpiFailurePolicy::Fail),
        "degrade" => Ok(KpiFailurePolicy::Degrade),
        _ => Err(format!(
            "Invalid KPI failure policy '{}'. Valid options: fail, degrade",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the HTTP server (default command)
    Serve,
    /// Print the SQL preview for a domain and filter set (no database needed)
    Preview {
        /// Domain: sales, procurement or finance
        domain: String,
        /// Filter values as a JSON object
        #[arg(long, short = 'f')]
        filters: Option<String>,
    },
    /// Execute one run and print it as JSON
    Run {
        /// Domain: sales, procurement or finance
        domain: String,
        /// Filter values as a JSON object
        #[arg(long, short = 'f')]
        filters: Option<String>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub kpi_failure_policy: Option<KpiFailurePolicy>,
    pub session_idle_secs: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        database_url: cli.database_url,
        db_max_connections: cli.db_max_connections,
        kpi_failure_policy: cli.kpi_failure_policy,
        session_idle_secs: cli.session_idle_secs,
    };
    (config, cli.command)
}
