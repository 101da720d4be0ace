//! The field matcher contract and its shared options.

use serde::{Deserialize, Serialize};

use dedup_model::{FieldKind, FieldValue};

/// Intra-field weights for address sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddressWeights {
    pub street: f64,
    pub city: f64,
    pub postal: f64,
}

impl Default for AddressWeights {
    fn default() -> Self {
        Self {
            street: 0.5,
            city: 0.3,
            postal: 0.2,
        }
    }
}

/// Options shared by all matchers in a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherOptions {
    /// Score returned when both sides are blank. Blank/blank carries no
    /// evidence, so the default is 0.
    pub blank_pair_score: f64,
    /// When set, the phonetic matcher blends edit-distance similarity into
    /// its binary encoding comparison: `blend * distance + (1 - blend) *
    /// phonetic`. `None` keeps the binary score.
    pub phonetic_blend: Option<f64>,
    /// Absolute difference at which numeric proximity reaches 0.
    pub number_tolerance: f64,
    /// Day difference at which date proximity reaches 0.
    pub date_tolerance_days: f64,
    /// Sub-field weights used by the address matcher.
    pub address_weights: AddressWeights,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            blank_pair_score: 0.0,
            phonetic_blend: None,
            number_tolerance: 10.0,
            date_tolerance_days: 30.0,
            address_weights: AddressWeights::default(),
        }
    }
}

/// Presence of the two sides of a field comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankState {
    BothBlank,
    OneBlank,
    BothPresent,
}

/// Classifies a value pair for the common blank-handling contract:
/// missing or blank on one side scores 0, blank on both sides scores the
/// configured neutral value.
pub fn blank_state(a: Option<&FieldValue>, b: Option<&FieldValue>) -> BlankState {
    let a_blank = a.is_none_or(FieldValue::is_blank);
    let b_blank = b.is_none_or(FieldValue::is_blank);
    match (a_blank, b_blank) {
        (true, true) => BlankState::BothBlank,
        (false, false) => BlankState::BothPresent,
        _ => BlankState::OneBlank,
    }
}

/// A pure similarity function over one field's values.
///
/// Implementations must be side-effect free, deterministic, symmetric
/// unless documented otherwise, and must return scores in [0, 1] without
/// panicking on null or blank input.
pub trait FieldMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this matcher produces meaningful scores for the given kind.
    /// The registry falls back to exact matching on stringified values when
    /// this returns false.
    fn can_handle(&self, kind: FieldKind) -> bool;

    fn score(
        &self,
        a: Option<&FieldValue>,
        b: Option<&FieldValue>,
        options: &MatcherOptions,
    ) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_state_covers_missing_and_whitespace() {
        let blank = FieldValue::Text("  ".into());
        let value = FieldValue::Text("x".into());
        assert_eq!(blank_state(None, None), BlankState::BothBlank);
        assert_eq!(blank_state(Some(&blank), None), BlankState::BothBlank);
        assert_eq!(blank_state(Some(&value), None), BlankState::OneBlank);
        assert_eq!(
            blank_state(Some(&blank), Some(&value)),
            BlankState::OneBlank
        );
        assert_eq!(
            blank_state(Some(&value), Some(&value)),
            BlankState::BothPresent
        );
    }
}
