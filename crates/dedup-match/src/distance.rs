//! Numeric and date proximity matching.

use dedup_model::{FieldKind, FieldValue};

use crate::matcher::{BlankState, FieldMatcher, MatcherOptions, blank_state};

/// Proximity score `1 - min(1, |a - b| / tolerance)` for numbers and dates.
///
/// Tolerances come from `MatcherOptions` (`number_tolerance`,
/// `date_tolerance_days`). Values of different kinds never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceMatcher;

fn proximity(difference: f64, tolerance: f64) -> f64 {
    if tolerance <= 0.0 {
        return if difference == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - (difference / tolerance).min(1.0)).clamp(0.0, 1.0)
}

impl FieldMatcher for DistanceMatcher {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn can_handle(&self, kind: FieldKind) -> bool {
        matches!(kind, FieldKind::Number | FieldKind::Date)
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
                (Some(FieldValue::Number(x)), Some(FieldValue::Number(y))) => {
                    if !x.is_finite() || !y.is_finite() {
                        return 0.0;
                    }
                    proximity((x - y).abs(), options.number_tolerance)
                }
                (Some(FieldValue::Date(x)), Some(FieldValue::Date(y))) => {
                    let days = (*x - *y).num_days().unsigned_abs() as f64;
                    proximity(days, options.date_tolerance_days)
                }
                _ => 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> FieldValue {
        FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn equal_numbers_score_one() {
        let options = MatcherOptions::default();
        let v = FieldValue::Number(10.0);
        assert_eq!(DistanceMatcher.score(Some(&v), Some(&v), &options), 1.0);
    }

    #[test]
    fn numbers_decay_linearly_to_tolerance() {
        let options = MatcherOptions {
            number_tolerance: 10.0,
            ..MatcherOptions::default()
        };
        let a = FieldValue::Number(0.0);
        let b = FieldValue::Number(5.0);
        let c = FieldValue::Number(25.0);
        assert_eq!(DistanceMatcher.score(Some(&a), Some(&b), &options), 0.5);
        assert_eq!(DistanceMatcher.score(Some(&a), Some(&c), &options), 0.0);
    }

    #[test]
    fn dates_use_day_tolerance() {
        let options = MatcherOptions {
            date_tolerance_days: 30.0,
            ..MatcherOptions::default()
        };
        let a = date(2024, 1, 1);
        let b = date(2024, 1, 16);
        let score = DistanceMatcher.score(Some(&a), Some(&b), &options);
        assert_eq!(score, 0.5);
    }

    #[test]
    fn mixed_kinds_never_match() {
        let options = MatcherOptions::default();
        let number = FieldValue::Number(42.0);
        let text = FieldValue::Text("42".into());
        assert_eq!(
            DistanceMatcher.score(Some(&number), Some(&text), &options),
            0.0
        );
    }

    #[test]
    fn zero_tolerance_requires_exact_equality() {
        let options = MatcherOptions {
            number_tolerance: 0.0,
            ..MatcherOptions::default()
        };
        let a = FieldValue::Number(1.0);
        let b = FieldValue::Number(1.0);
        let c = FieldValue::Number(1.1);
        assert_eq!(DistanceMatcher.score(Some(&a), Some(&b), &options), 1.0);
        assert_eq!(DistanceMatcher.score(Some(&a), Some(&c), &options), 0.0);
    }
}
