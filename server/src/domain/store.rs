//! In-memory run history

use uuid::Uuid;

use super::catalog::Domain;
use super::run::{Run, RunStatus};

/// Ordered list of runs belonging to one session
#[derive(Debug, Default)]
pub struct RunStore {
    runs: Vec<Run>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run and return it
    pub fn add(&mut self, run: Run) -> &Run {
        self.runs.push(run);
        &self.runs[self.runs.len() - 1]
    }

    /// Runs newest first, optionally restricted to one domain
    ///
    /// Runs with the same timestamp keep their insertion order.
    pub fn list(&self, domain: Option<Domain>) -> Vec<&Run> {
        let mut runs: Vec<&Run> = self
            .runs
            .iter()
            .filter(|r| domain.is_none_or(|d| r.domain() == d))
            .collect();
        runs.sort_by(|a, b| b.executed_at().cmp(&a.executed_at()));
        runs
    }

    /// Completed runs, newest first
    pub fn completed(&self, domain: Option<Domain>) -> Vec<&Run> {
        self.list(domain)
            .into_iter()
            .filter(|r| r.status() == RunStatus::Completed)
            .collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&Run> {
        self.runs.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn count(&self, domain: Option<Domain>) -> usize {
        self.runs
            .iter()
            .filter(|r| domain.is_none_or(|d| r.domain() == d))
            .count()
    }

    /// Remove every run, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.runs.len();
        self.runs.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
