//! Pairwise similarity scores produced by the match scorer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// Similarity of one record pair.
///
/// `aggregate` is the weighted mean of `field_scores` using normalized
/// weights: fields blank on both sides are excluded from the denominator,
/// fields blank on exactly one side score 0. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScore {
    pub record_a: RecordId,
    pub record_b: RecordId,
    pub field_scores: BTreeMap<String, f64>,
    pub aggregate: f64,
}

impl PairScore {
    /// True when the pair clears the duplicate threshold.
    pub fn is_match(&self, threshold: f64) -> bool {
        self.aggregate >= threshold
    }
}
