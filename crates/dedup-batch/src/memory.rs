//! Deterministic in-memory repository used by the CLI and the test suite.

use std::collections::{BTreeMap, BTreeSet};

use dedup_model::{CandidateRecord, JobRunState, MatchConfig, MergePlan, RecordId};

use crate::error::RepositoryError;
use crate::repository::{MergeOutcome, RecordPage, RecordRepository};

/// Repository backed by a plain vector of records.
///
/// Cursors are stringified record offsets. Failure injection hooks let
/// orchestrator tests exercise backpressure, fetch failures, and partial
/// plan application without a real backend.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: Vec<CandidateRecord>,
    configs: BTreeMap<String, MatchConfig>,
    applied_plans: Vec<MergePlan>,
    persisted_states: Vec<JobRunState>,
    backpressure_rejects: usize,
    fail_apply_for: BTreeSet<RecordId>,
    fail_fetch_after_pages: Option<usize>,
    pages_served: usize,
}

impl InMemoryRepository {
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_config(mut self, config_id: &str, config: MatchConfig) -> Self {
        self.configs.insert(config_id.to_string(), config);
        self
    }

    /// The next `rejects` fetches answer with backpressure.
    pub fn inject_backpressure(&mut self, rejects: usize) {
        self.backpressure_rejects = rejects;
    }

    /// Plans whose master is `master_id` report a failed outcome.
    pub fn fail_apply_for(&mut self, master_id: RecordId) {
        self.fail_apply_for.insert(master_id);
    }

    /// Fetches fail with an i/o error once `pages` pages were served.
    pub fn fail_fetch_after(&mut self, pages: usize) {
        self.fail_fetch_after_pages = Some(pages);
    }

    pub fn applied_plans(&self) -> &[MergePlan] {
        &self.applied_plans
    }

    pub fn persisted_states(&self) -> &[JobRunState] {
        &self.persisted_states
    }

    pub fn last_persisted(&self) -> Option<&JobRunState> {
        self.persisted_states.last()
    }
}

impl RecordRepository for InMemoryRepository {
    fn load_config(&self, config_id: &str) -> Result<MatchConfig, RepositoryError> {
        self.configs
            .get(config_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("config '{config_id}'")))
    }

    fn fetch_page(
        &mut self,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<RecordPage, RepositoryError> {
        if self.backpressure_rejects > 0 {
            self.backpressure_rejects -= 1;
            return Err(RepositoryError::Backpressure);
        }
        if let Some(limit) = self.fail_fetch_after_pages
            && self.pages_served >= limit
        {
            return Err(RepositoryError::Io("injected fetch failure".to_string()));
        }

        let start = match cursor {
            None => 0,
            Some(cursor) => cursor.parse::<usize>().map_err(|error| {
                RepositoryError::Io(format!("malformed cursor '{cursor}': {error}"))
            })?,
        };
        let end = (start + page_size).min(self.records.len());
        let records = self.records.get(start..end).unwrap_or_default().to_vec();
        let has_more = end < self.records.len();
        self.pages_served += 1;

        Ok(RecordPage {
            records,
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    fn apply_merge_plan(
        &mut self,
        plan: &MergePlan,
    ) -> Result<MergeOutcome, RepositoryError> {
        if self.fail_apply_for.contains(&plan.master_id) {
            return Ok(MergeOutcome::failed(vec![format!(
                "record {} is locked by another process",
                plan.master_id
            )]));
        }
        self.applied_plans.push(plan.clone());
        Ok(MergeOutcome::ok())
    }

    fn persist_job_state(&mut self, state: &JobRunState) -> Result<(), RepositoryError> {
        self.persisted_states.push(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dedup_model::FieldValue;

    fn records(n: usize) -> Vec<CandidateRecord> {
        (0..n)
            .map(|i| {
                CandidateRecord::new(
                    format!("r{i}"),
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                )
                .with_field("Name", FieldValue::Text(format!("name {i}")))
            })
            .collect()
    }

    #[test]
    fn paging_walks_the_whole_set() {
        let mut repo = InMemoryRepository::new(records(5));
        let first = repo.fetch_page(None, 2).unwrap();
        assert_eq!(first.records.len(), 2);
        assert!(first.has_more);

        let second = repo
            .fetch_page(first.next_cursor.as_deref(), 2)
            .unwrap();
        assert_eq!(second.records[0].id.as_str(), "r2");

        let third = repo.fetch_page(second.next_cursor.as_deref(), 2).unwrap();
        assert_eq!(third.records.len(), 1);
        assert!(!third.has_more);
        assert!(third.next_cursor.is_none());
    }

    #[test]
    fn malformed_cursor_is_an_io_error() {
        let mut repo = InMemoryRepository::new(records(1));
        let err = repo.fetch_page(Some("not-a-number"), 2).unwrap_err();
        assert!(matches!(err, RepositoryError::Io(_)));
    }

    #[test]
    fn backpressure_clears_after_injected_count() {
        let mut repo = InMemoryRepository::new(records(1));
        repo.inject_backpressure(2);
        assert_eq!(
            repo.fetch_page(None, 10).unwrap_err(),
            RepositoryError::Backpressure
        );
        assert_eq!(
            repo.fetch_page(None, 10).unwrap_err(),
            RepositoryError::Backpressure
        );
        assert!(repo.fetch_page(None, 10).is_ok());
    }

    #[test]
    fn missing_config_is_not_found() {
        let repo = InMemoryRepository::new(Vec::new());
        let err = repo.load_config("nope").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
