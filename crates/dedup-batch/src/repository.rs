//! The external collaborator boundary: record storage behind a trait.
//!
//! The engine never touches storage directly. Everything it needs from the
//! outside world (configuration, paged record access, plan application,
//! checkpoint persistence) goes through [`RecordRepository`], so backends
//! can be swapped without touching orchestration.

use dedup_model::{CandidateRecord, JobRunState, MatchConfig, MergePlan};

use crate::error::RepositoryError;

/// One page of candidate records.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub records: Vec<CandidateRecord>,
    /// Opaque cursor for the next page; `None` on the last page.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Result of applying one merge plan to storage.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub success: bool,
    pub errors: Vec<String>,
}

impl MergeOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
        }
    }
}

/// Storage operations the orchestrator depends on.
///
/// Cursors are opaque strings minted by the implementation; the runner only
/// stores and echoes them. `apply_merge_plan` must be atomic per plan: a
/// plan either applies fully or reports failure in the outcome.
pub trait RecordRepository {
    fn load_config(&self, config_id: &str) -> Result<MatchConfig, RepositoryError>;

    fn fetch_page(
        &mut self,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<RecordPage, RepositoryError>;

    fn apply_merge_plan(&mut self, plan: &MergePlan)
    -> Result<MergeOutcome, RepositoryError>;

    fn persist_job_state(&mut self, state: &JobRunState) -> Result<(), RepositoryError>;
}
