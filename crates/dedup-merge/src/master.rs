//! Master selection: which record in a duplicate group survives the merge.

use std::cmp::Ordering;

use dedup_model::{CandidateRecord, MasterStrategy};

use crate::error::MergeError;

/// Picks the surviving record of a duplicate group.
///
/// Ties break deterministically: equal timestamps fall back to the
/// smallest record id, and equal completeness falls back to the
/// oldest-created rule. The same input always yields the same master.
pub fn select_master<'a>(
    records: &'a [CandidateRecord],
    strategy: MasterStrategy,
    match_fields: &[&str],
) -> Result<&'a CandidateRecord, MergeError> {
    if records.len() < 2 {
        return Err(MergeError::EmptyGroup(records.len()));
    }
    let master = match strategy {
        MasterStrategy::OldestCreated => records.iter().min_by(oldest_then_id),
        MasterStrategy::NewestCreated => records.iter().min_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        }),
        MasterStrategy::MostComplete => records.iter().min_by(|a, b| {
            let complete_a = a.completeness(match_fields.iter().copied());
            let complete_b = b.completeness(match_fields.iter().copied());
            complete_b
                .cmp(&complete_a)
                .then_with(|| oldest_then_id(a, b))
        }),
    };
    // len >= 2 was checked above.
    master.ok_or(MergeError::EmptyGroup(0))
}

fn oldest_then_id(a: &&CandidateRecord, b: &&CandidateRecord) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}
