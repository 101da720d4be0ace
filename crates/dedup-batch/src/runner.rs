//! The batch job state machine.
//!
//! `Queued -> Preparing -> Processing -> {Completed | Failed | Aborted}`,
//! with `Holding` entered under repository backpressure and left either
//! back to `Processing` or to `Failed` once resume attempts run out.
//!
//! Each tick handles one page: fetch, group, select masters, resolve
//! plans, apply (unless dry-run), accumulate statistics, advance the
//! cursor, persist the checkpoint. The cursor never moves past a page
//! whose writes were not flushed, so a crashed job resumes from its last
//! persisted state without double-merging.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tracing::{debug, info, warn};

use dedup_group::{BlockingKeyFn, group_records};
use dedup_match::MatcherRegistry;
use dedup_merge::{resolve, select_master};
use dedup_model::{
    CandidateRecord, DuplicateGroup, GroupId, JobRunState, JobStatus, MatchConfig,
    MergePlan,
};

use crate::error::{JobError, RepositoryError};
use crate::repository::RecordRepository;

const DEFAULT_RESUME_ATTEMPTS: usize = 5;

/// Cooperative cancellation flag, checked at page boundaries only so an
/// abort never leaves a half-flushed checkpoint behind.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Artifacts of one finished run, alongside the persisted [`JobRunState`].
#[derive(Debug, Clone, Default)]
pub struct JobReport {
    pub pages: usize,
    /// Groups found, with masters assigned.
    pub groups: Vec<DuplicateGroup>,
    /// One plan per merged (or dry-run planned) group, in group order.
    pub plans: Vec<MergePlan>,
}

impl JobReport {
    pub fn conflict_count(&self) -> usize {
        self.plans.iter().map(|plan| plan.conflicts.len()).sum()
    }
}

/// Drives one job against a repository. Single-threaded by design; one
/// runner owns one job's state for the duration of the run.
pub struct JobRunner<'a, R: RecordRepository> {
    repository: &'a mut R,
    registry: &'a MatcherRegistry,
    abort: AbortHandle,
    blocking: Option<&'a BlockingKeyFn<'a>>,
    max_resume_attempts: usize,
}

impl<'a, R: RecordRepository> JobRunner<'a, R> {
    pub fn new(repository: &'a mut R, registry: &'a MatcherRegistry) -> Self {
        Self {
            repository,
            registry,
            abort: AbortHandle::new(),
            blocking: None,
            max_resume_attempts: DEFAULT_RESUME_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_abort(mut self, handle: AbortHandle) -> Self {
        self.abort = handle;
        self
    }

    /// Restricts pairwise comparison to records sharing a blocking key.
    /// Records mapped to `None` are excluded from comparison entirely.
    #[must_use]
    pub fn with_blocking_key(mut self, blocking: &'a BlockingKeyFn<'a>) -> Self {
        self.blocking = Some(blocking);
        self
    }

    #[must_use]
    pub fn with_max_resume_attempts(mut self, attempts: usize) -> Self {
        self.max_resume_attempts = attempts.max(1);
        self
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Runs the job to a terminal status.
    ///
    /// The caller owns `state` and keeps it even when the run errors; the
    /// final status is always written into it and persisted.
    pub fn run(
        &mut self,
        state: &mut JobRunState,
        config: &MatchConfig,
    ) -> Result<JobReport, JobError> {
        if let Err(error) = config.validate() {
            return Err(self.fail(state, JobError::Config(error)));
        }

        state.status = JobStatus::Preparing;
        state.last_update = Utc::now();
        if let Err(error) = self.repository.persist_job_state(state) {
            return Err(self.fail(state, JobError::Repository(error)));
        }

        info!(job = %state.job_id, dry_run = state.is_dry_run, "job started");
        state.status = JobStatus::Processing;

        let match_fields: Vec<&str> = config.field_names().collect();
        let mut report = JobReport::default();
        let mut failed_groups: Vec<GroupId> = Vec::new();

        loop {
            if self.abort.is_aborted() {
                state.status = JobStatus::Aborted;
                state.note("aborted at page boundary", Utc::now());
                if let Err(error) = self.repository.persist_job_state(state) {
                    return Err(self.fail(state, JobError::Repository(error)));
                }
                info!(job = %state.job_id, pages = report.pages, "job aborted");
                return Ok(report);
            }

            let cursor = state.cursor.clone();
            let page = match self.with_hold(state, |repo| {
                repo.fetch_page(cursor.as_deref(), config.page_size)
            }) {
                Ok(page) => page,
                Err(error) => return Err(self.fail(state, error)),
            };

            let outcome = match group_records(
                &page.records,
                config,
                self.registry,
                self.blocking,
            ) {
                Ok(outcome) => outcome,
                Err(error) => return Err(self.fail(state, JobError::Config(error))),
            };
            if outcome.oversized_groups > 0 {
                state.groups_dropped += outcome.oversized_groups;
                state.note(
                    format!(
                        "dropped {} oversized transitive group(s)",
                        outcome.oversized_groups
                    ),
                    Utc::now(),
                );
                warn!(
                    job = %state.job_id,
                    dropped = outcome.oversized_groups,
                    "oversized transitive groups dropped"
                );
            }

            for mut group in outcome.groups {
                let members: Vec<CandidateRecord> = page
                    .records
                    .iter()
                    .filter(|record| group.contains(&record.id))
                    .cloned()
                    .collect();
                let master =
                    match select_master(&members, config.master_strategy, &match_fields)
                    {
                        Ok(master) => master,
                        Err(error) => {
                            warn!(group = %group.id, %error, "group skipped");
                            state.note(
                                format!("group {} skipped: {error}", group.id),
                                Utc::now(),
                            );
                            continue;
                        }
                    };
                let duplicates: Vec<&CandidateRecord> =
                    members.iter().filter(|r| r.id != master.id).collect();
                let plan = match resolve(master, &duplicates, &BTreeMap::new()) {
                    Ok(plan) => plan,
                    Err(error) => {
                        warn!(group = %group.id, %error, "group skipped");
                        state.note(
                            format!("group {} skipped: {error}", group.id),
                            Utc::now(),
                        );
                        continue;
                    }
                };
                group.master_id = Some(plan.master_id.clone());
                state.duplicates_found += plan.duplicate_ids.len();

                if !state.is_dry_run {
                    let applied = match self
                        .with_hold(state, |repo| repo.apply_merge_plan(&plan))
                    {
                        Ok(outcome) => outcome,
                        Err(error) => return Err(self.fail(state, error)),
                    };
                    if applied.success {
                        state.records_merged += plan.duplicate_ids.len();
                    } else {
                        state.note(
                            format!(
                                "apply failed for group {}: {}",
                                group.id,
                                applied.errors.join("; ")
                            ),
                            Utc::now(),
                        );
                        failed_groups.push(group.id.clone());
                    }
                }

                report.groups.push(group);
                report.plans.push(plan);
            }

            state.records_processed += page.records.len();
            state.cursor = page.next_cursor.clone();
            state.last_update = Utc::now();
            report.pages += 1;

            if let Err(error) = self.repository.persist_job_state(state) {
                return Err(self.fail(state, JobError::Repository(error)));
            }
            debug!(
                job = %state.job_id,
                page = report.pages,
                records = state.records_processed,
                duplicates = state.duplicates_found,
                "page checkpointed"
            );

            if !page.has_more {
                break;
            }
        }

        if !failed_groups.is_empty() {
            return Err(self.fail(
                state,
                JobError::PartialApply {
                    group_ids: failed_groups,
                },
            ));
        }

        state.status = JobStatus::Completed;
        state.last_update = Utc::now();
        if let Err(error) = self.repository.persist_job_state(state) {
            return Err(self.fail(state, JobError::Repository(error)));
        }
        info!(
            job = %state.job_id,
            pages = report.pages,
            records = state.records_processed,
            duplicates = state.duplicates_found,
            merged = state.records_merged,
            "job completed"
        );
        Ok(report)
    }

    /// Runs a repository operation, entering `Holding` on backpressure and
    /// retrying up to the resume budget before giving up.
    fn with_hold<T>(
        &mut self,
        state: &mut JobRunState,
        mut op: impl FnMut(&mut R) -> Result<T, RepositoryError>,
    ) -> Result<T, JobError> {
        let mut attempts = 0usize;
        loop {
            match op(self.repository) {
                Ok(value) => {
                    if state.status == JobStatus::Holding {
                        state.status = JobStatus::Processing;
                        state.note("backpressure cleared, resuming", Utc::now());
                        info!(job = %state.job_id, attempts, "resumed after holding");
                    }
                    return Ok(value);
                }
                Err(RepositoryError::Backpressure) => {
                    attempts += 1;
                    if state.status != JobStatus::Holding {
                        state.status = JobStatus::Holding;
                        state.note("repository backpressure, holding", Utc::now());
                        warn!(job = %state.job_id, "repository backpressure, holding");
                    }
                    if attempts >= self.max_resume_attempts {
                        return Err(JobError::Repository(RepositoryError::Backpressure));
                    }
                }
                Err(error) => return Err(JobError::Repository(error)),
            }
        }
    }

    /// Marks the job failed and makes a best effort to persist that fact.
    fn fail(&mut self, state: &mut JobRunState, error: JobError) -> JobError {
        state.status = JobStatus::Failed;
        state.note(error.to_string(), Utc::now());
        if let Err(persist_error) = self.repository.persist_job_state(state) {
            warn!(job = %state.job_id, %persist_error, "could not persist failed state");
        }
        error
    }
}
