use dedup_model::RecordId;
use thiserror::Error;

/// Errors raised while selecting a master or resolving a merge plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A merge needs a master plus at least one duplicate.
    #[error("merge group needs at least two records, got {0}")]
    EmptyGroup(usize),

    /// A record referenced as master or override source is not a member
    /// of the group being merged.
    #[error("record '{0}' is not a member of the merge group")]
    InvalidMaster(RecordId),
}
