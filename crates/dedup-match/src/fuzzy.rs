//! Edit-distance text similarity.

use rapidfuzz::distance::levenshtein;

use dedup_model::{FieldKind, FieldValue};

use crate::matcher::{BlankState, FieldMatcher, MatcherOptions, blank_state};
use crate::normalize::normalize_text;

/// Normalized Levenshtein similarity (`1 - distance / max_length`) on
/// normalized text, clamped to [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

/// Similarity of two already-normalized strings.
pub(crate) fn edit_similarity(a: &str, b: &str) -> f64 {
    levenshtein::normalized_similarity(a.chars(), b.chars()).clamp(0.0, 1.0)
}

impl FieldMatcher for FuzzyMatcher {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn can_handle(&self, kind: FieldKind) -> bool {
        kind == FieldKind::Text
    }

    fn score(
        &self,
        a: Option<&FieldValue>,
        b: Option<&FieldValue>,
        options: &MatcherOptions,
    ) -> f64 {
        match blank_state(a, b) {
            BlankState::BothBlank => options.blank_pair_score,
            BlankState::OneBlank => 0.0,
            BlankState::BothPresent => match (a, b) {
                (Some(a), Some(b)) => edit_similarity(
                    &normalize_text(&a.display_string()),
                    &normalize_text(&b.display_string()),
                ),
                _ => 0.0,
            },
        }
    }
}
