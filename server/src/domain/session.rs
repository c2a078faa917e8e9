//! Per-user dashboard sessions
//!
//! A `Session` owns the run history, the current domain and the current run.
//! Sessions live in a `SessionRegistry` keyed by id and are handed out as
//! `Arc<Mutex<Session>>`, so a session executes at most one run at a time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::catalog::Domain;
use super::error::RunError;
use super::executor::execute;
use super::filters::FilterSet;
use super::queries::preview_sql;
use super::run::Run;
use super::store::RunStore;
use crate::core::config::{KpiFailurePolicy, SessionConfig};
use crate::data::FactRepository;

/// Explicit per-user dashboard state
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    current_domain: Domain,
    runs: RunStore,
    current_run: Option<Uuid>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            current_domain: Domain::Sales,
            runs: RunStore::new(),
            current_run: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn current_domain(&self) -> Domain {
        self.current_domain
    }

    pub fn set_current_domain(&mut self, domain: Domain) {
        self.current_domain = domain;
    }

    pub fn runs(&self) -> &RunStore {
        &self.runs
    }

    pub fn current_run(&self) -> Option<&Run> {
        self.current_run.and_then(|id| self.runs.get(id))
    }

    /// Select an existing run as the current one
    pub fn set_current_run(&mut self, id: Uuid) -> Result<&Run, RunError> {
        if !self.runs.contains(id) {
            return Err(RunError::NotFound(id));
        }
        self.current_run = Some(id);
        self.runs.get(id).ok_or(RunError::NotFound(id))
    }

    pub fn clear_current_run(&mut self) {
        self.current_run = None;
    }

    /// Drop the whole run history, returning how many runs were removed
    pub fn clear_runs(&mut self) -> usize {
        self.current_run = None;
        self.runs.clear()
    }

    /// Execute a run and record it, whatever its outcome
    ///
    /// Query failures produce a `Failed` run; the returned error is reserved
    /// for lifecycle violations.
    pub async fn execute_run(
        &mut self,
        repo: &dyn FactRepository,
        filters: FilterSet,
        policy: KpiFailurePolicy,
    ) -> Result<&Run, RunError> {
        let domain = filters.domain();
        let mut run = Run::new(&filters, preview_sql(&filters));
        run.start()?;

        match execute(repo, &filters, policy).await {
            Ok(execution) => {
                run.complete(execution.result, execution.degraded)?;
                tracing::info!(
                    session_id = %self.id,
                    run_id = %run.id(),
                    domain = %domain,
                    degraded = execution.degraded,
                    "Run completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    run_id = %run.id(),
                    domain = %domain,
                    connectivity = e.is_connectivity(),
                    error = %e,
                    "Run failed"
                );
                run.fail(e.to_string())?;
            }
        }

        self.current_domain = domain;
        self.current_run = Some(run.id());
        Ok(self.runs.add(run))
    }
}

/// Session shared between requests
pub type SharedSession = Arc<Mutex<Session>>;

/// Live sessions keyed by id, expiring after a period of inactivity
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Cache<Uuid, SharedSession>,
}

impl SessionRegistry {
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = Cache::builder()
            .max_capacity(config.max_sessions)
            .time_to_idle(Duration::from_secs(config.idle_timeout_secs))
            .build();
        Self { sessions }
    }

    /// Start a new session
    pub async fn create(&self) -> (Uuid, SharedSession) {
        let session = Session::new();
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.insert(id, Arc::clone(&shared)).await;
        tracing::debug!(session_id = %id, "Session created");
        (id, shared)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.get(&id).await
    }

    /// End a session; returns false when it did not exist
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.remove(&id).await.is_some();
        if removed {
            tracing::debug!(session_id = %id, "Session ended");
        }
        removed
    }

    /// Number of live sessions
    pub async fn len(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
