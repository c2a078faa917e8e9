//! Core application

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::FactService;
use crate::domain::inspect;
use crate::domain::{Domain, FilterSet, RunStatus, Session, SessionRegistry, preview_for};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub facts: Arc<FactService>,
    pub sessions: SessionRegistry,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Preview { domain, filters }) => {
                Self::print_preview(&domain, filters.as_deref())
            }
            Some(Commands::Run { domain, filters }) => {
                Self::run_headless(&cli_config, &domain, filters.as_deref()).await
            }
            Some(Commands::Serve) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let facts = Arc::new(
            FactService::init(&config.database)
                .await
                .context("Failed to initialize fact database")?,
        );
        let sessions = SessionRegistry::new(&config.sessions);
        let shutdown = ShutdownService::new(Some(facts.clone()));

        Ok(Self {
            shutdown,
            config,
            facts,
            sessions,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Print the SQL preview for a filter set without touching the database
    fn print_preview(domain: &str, filters: Option<&str>) -> Result<()> {
        let raw = parse_filters(filters)?;
        println!("{}", preview_for(domain, &raw));

        if let Ok(domain) = Domain::parse(domain)
            && let Ok(set) = FilterSet::from_json(domain, &raw)
        {
            println!();
            println!("-- Filters: {}", set.summary());
        }
        Ok(())
    }

    /// Execute one run in a throwaway session and print it as JSON
    async fn run_headless(cli: &CliConfig, domain: &str, filters: Option<&str>) -> Result<()> {
        let domain = Domain::parse(domain)?;
        let filters = FilterSet::from_json(domain, &parse_filters(filters)?)?;

        let config = AppConfig::load(cli)?;
        let facts = FactService::init(&config.database)
            .await
            .context("Failed to initialize fact database")?;
        let repo = facts.repository();

        let outcome = async {
            if filters.has_selections() {
                let options =
                    inspect::filter_options(repo.as_ref(), domain, &config.filter_options).await;
                filters.check_options(&options)?;
            }
            let mut session = Session::new();
            let run = session
                .execute_run(repo.as_ref(), filters, config.runs.kpi_failure_policy)
                .await?;
            println!("{}", serde_json::to_string_pretty(run)?);
            Ok::<_, anyhow::Error>(run.status())
        }
        .await;

        facts.close().await;
        if outcome? == RunStatus::Failed {
            bail!("Run failed");
        }
        Ok(())
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        if let Some(handle) = app.facts.start_health_check_task(app.shutdown.subscribe()) {
            app.shutdown.register(handle).await;
        }

        let status = inspect::database_status(app.facts.repository().as_ref()).await;
        tracing::debug!(connected = status.connected, "Startup database check");

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.facts.backend().name(),
            &app.config.database.target.redacted(),
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}

/// Parse the `--filters` argument; absent means no filters
fn parse_filters(filters: Option<&str>) -> Result<Value> {
    match filters {
        Some(text) => serde_json::from_str(text).context("--filters must be valid JSON"),
        None => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() {
        assert_eq!(parse_filters(None).unwrap(), Value::Null);
        let value = parse_filters(Some(r#"{"regions": ["DACH"]}"#)).unwrap();
        assert_eq!(value["regions"][0], "DACH");
        assert!(parse_filters(Some("{not json")).is_err());
    }

    #[test]
    fn test_print_preview_accepts_unknown_domain() {
        assert!(CoreApp::print_preview("hr", None).is_ok());
        assert!(CoreApp::print_preview("sales", Some(r#"{"channels": ["Online"]}"#)).is_ok());
    }
}
