use dedup_model::{ConfigError, GroupId};
use thiserror::Error;

/// Failures reported by the external record repository.
///
/// `Backpressure` is transient and retried with bounded attempts; the other
/// variants are treated as unrecoverable for the current job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("repository is applying backpressure")]
    Backpressure,

    #[error("repository i/o failure: {0}")]
    Io(String),

    #[error("not found in repository: {0}")]
    NotFound(String),
}

/// Orchestration-level job failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    #[error("invalid match configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Some merge plans were rejected by the repository. The job finishes
    /// the page but is marked failed; it never silently reports success.
    #[error("merge plans failed to apply for {} group(s)", group_ids.len())]
    PartialApply { group_ids: Vec<GroupId> },
}
