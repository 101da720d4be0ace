//! Caller-facing surface for launching and observing jobs.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;

use dedup_match::MatcherRegistry;
use dedup_model::{JobId, JobRunState};

use crate::error::JobError;
use crate::repository::RecordRepository;
use crate::runner::{AbortHandle, JobReport, JobRunner};

/// Owns a repository and runs deduplication jobs against it.
///
/// Job ids derive from the configuration id plus a per-service counter, so
/// repeated runs of the same configuration stay distinguishable. Final run
/// states are retained for status polling even after a job fails.
///
/// Blocking hooks are a runner-level concern: construct a [`JobRunner`]
/// directly and use [`JobRunner::with_blocking_key`] to supply one.
pub struct JobService<R: RecordRepository> {
    repository: R,
    registry: MatcherRegistry,
    states: BTreeMap<JobId, JobRunState>,
    reports: BTreeMap<JobId, JobReport>,
    handles: BTreeMap<JobId, AbortHandle>,
    counter: usize,
}

impl<R: RecordRepository> JobService<R> {
    pub fn new(repository: R, registry: MatcherRegistry) -> Self {
        Self {
            repository,
            registry,
            states: BTreeMap::new(),
            reports: BTreeMap::new(),
            handles: BTreeMap::new(),
            counter: 0,
        }
    }

    /// Loads the configuration, runs the job to a terminal status, and
    /// returns its id. The final state is stored either way; the report is
    /// only available for jobs that finished without an orchestration
    /// error.
    pub fn start_job(
        &mut self,
        config_id: &str,
        dry_run: bool,
        page_size_override: Option<usize>,
    ) -> Result<JobId, JobError> {
        let mut config = self.repository.load_config(config_id)?;
        if let Some(page_size) = page_size_override {
            config.page_size = page_size;
        }

        self.counter += 1;
        let job_id = JobId::new(format!("{config_id}-{}", self.counter));
        debug!(job = %job_id, config_id, dry_run, "launching job");

        let handle = AbortHandle::new();
        self.handles.insert(job_id.clone(), handle.clone());

        let mut state = JobRunState::new(job_id.clone(), dry_run, Utc::now());
        let result = JobRunner::new(&mut self.repository, &self.registry)
            .with_abort(handle)
            .run(&mut state, &config);
        self.states.insert(job_id.clone(), state);

        let report = result?;
        self.reports.insert(job_id.clone(), report);
        Ok(job_id)
    }

    pub fn job_status(&self, job_id: &JobId) -> Option<&JobRunState> {
        self.states.get(job_id)
    }

    pub fn job_report(&self, job_id: &JobId) -> Option<&JobReport> {
        self.reports.get(job_id)
    }

    /// Handle for requesting cancellation at the next page boundary.
    pub fn cancel_handle(&self, job_id: &JobId) -> Option<AbortHandle> {
        self.handles.get(job_id).cloned()
    }

    /// Requests cancellation of a job at its next page boundary. Returns
    /// false for unknown job ids.
    pub fn cancel(&self, job_id: &JobId) -> bool {
        match self.handles.get(job_id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// State of the most recently launched job, finished or not.
    pub fn last_job(&self) -> Option<&JobRunState> {
        self.states.values().max_by_key(|state| state.started_at)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}
