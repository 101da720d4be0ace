//! Case- and whitespace-normalized equality matching.

use dedup_model::{FieldKind, FieldValue};

use crate::matcher::{BlankState, FieldMatcher, MatcherOptions, blank_state};
use crate::normalize::normalize_text;

/// Binary matcher: 1.0 when the normalized stringified values are equal,
/// 0.0 otherwise. Handles every field kind, which makes it the registry's
/// fallback for unknown strategies and unsupported kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl FieldMatcher for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn can_handle(&self, _kind: FieldKind) -> bool {
        true
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
                (Some(a), Some(b)) => {
                    let equal = normalize_text(&a.display_string())
                        == normalize_text(&b.display_string());
                    if equal { 1.0 } else { 0.0 }
                }
                _ => 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.into())
    }

    #[test]
    fn normalized_equality() {
        let options = MatcherOptions::default();
        let a = text("  Acme  CORP ");
        let b = text("acme corp");
        assert_eq!(ExactMatcher.score(Some(&a), Some(&b), &options), 1.0);
    }

    #[test]
    fn different_values_score_zero() {
        let options = MatcherOptions::default();
        assert_eq!(
            ExactMatcher.score(Some(&text("Acme")), Some(&text("Apex")), &options),
            0.0
        );
    }

    #[test]
    fn cross_kind_comparison_stringifies() {
        let options = MatcherOptions::default();
        let number = FieldValue::Number(42.0);
        let as_text = text("42");
        assert_eq!(
            ExactMatcher.score(Some(&number), Some(&as_text), &options),
            1.0
        );
    }

    #[test]
    fn blank_contract() {
        let options = MatcherOptions {
            blank_pair_score: 0.5,
            ..MatcherOptions::default()
        };
        assert_eq!(ExactMatcher.score(None, None, &options), 0.5);
        assert_eq!(
            ExactMatcher.score(Some(&text("x")), None, &options),
            0.0
        );
    }
}
