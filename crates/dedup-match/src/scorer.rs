//! Weighted pairwise scoring over configured fields.

use std::collections::BTreeMap;

use dedup_model::{CandidateRecord, ConfigError, FieldValue, MatchConfig, PairScore};

use crate::registry::MatcherRegistry;

/// Scores one record pair against a weighted field configuration.
///
/// Per configured field: resolve a matcher, score, and accumulate
/// `score * weight`. The denominator is the sum of weights of fields
/// present on both sides. Fields blank on both sides are excluded
/// entirely; a field blank on exactly one side is recorded in
/// `field_scores` as 0 for the audit trail but its weight stays out of
/// the weighted mean. Deterministic for identical inputs: no randomness,
/// no wall-clock reads.
///
/// Fails with `ConfigError` when the configuration has no usable fields.
/// When every configured field is blank on both records the aggregate is
/// 0.0 (no evidence).
pub fn score_pair(
    a: &CandidateRecord,
    b: &CandidateRecord,
    config: &MatchConfig,
    registry: &MatcherRegistry,
) -> Result<PairScore, ConfigError> {
    config.validate()?;

    let mut field_scores = BTreeMap::new();
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (field, rule) in &config.fields {
        if rule.weight <= 0.0 {
            continue;
        }
        let value_a = a.field(field);
        let value_b = b.field(field);
        let a_blank = value_a.is_none_or(FieldValue::is_blank);
        let b_blank = value_b.is_none_or(FieldValue::is_blank);
        if a_blank && b_blank {
            // No evidence on either side: excluded from the weighted mean
            continue;
        }
        if a_blank != b_blank {
            // Present on one side only: recorded as 0 for the audit trail,
            // weight left out of the mean
            field_scores.insert(field.clone(), 0.0);
            continue;
        }

        let kind = value_a
            .filter(|value| !value.is_blank())
            .or(value_b)
            .map(FieldValue::kind);
        let matcher = registry.resolve(rule.strategy.as_ref(), kind);
        let score = matcher
            .score(value_a, value_b, registry.options())
            .clamp(0.0, 1.0);

        field_scores.insert(field.clone(), score);
        numerator += score * rule.weight;
        denominator += rule.weight;
    }

    let aggregate = if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    };

    Ok(PairScore {
        record_a: a.id.clone(),
        record_b: b.id.clone(),
        field_scores,
        aggregate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dedup_model::{FieldRule, MatchStrategy};

    fn record(id: &str, fields: &[(&str, &str)]) -> CandidateRecord {
        let mut record =
            CandidateRecord::new(id, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        for (name, value) in fields {
            record
                .fields
                .insert((*name).to_string(), FieldValue::Text((*value).to_string()));
        }
        record
    }

    fn config(rules: &[(&str, f64, Option<MatchStrategy>)]) -> MatchConfig {
        let fields = rules
            .iter()
            .map(|(name, weight, strategy)| {
                let mut rule = FieldRule::weighted(*weight);
                rule.strategy = strategy.clone();
                ((*name).to_string(), rule)
            })
            .collect();
        MatchConfig::new(fields)
    }

    #[test]
    fn identical_records_score_one() {
        let registry = MatcherRegistry::default();
        let config = config(&[
            ("Name", 0.5, Some(MatchStrategy::Fuzzy)),
            ("Email", 0.8, None),
        ]);
        let a = record("a", &[("Name", "Acme"), ("Email", "hi@acme.test")]);
        let score = score_pair(&a, &a, &config, &registry).unwrap();
        assert_eq!(score.aggregate, 1.0);
    }

    #[test]
    fn worked_example_from_weighted_mean() {
        // Weights {Name: 0.5 fuzzy, Email: 0.8, Phone: 0.6}; identical
        // email, similar name, phone blank on one side. Phone is recorded
        // as 0 but its weight stays out of the mean, so the aggregate is
        // (0.5*name + 0.8*1.0) / 1.3 and the pair clears a 0.75 threshold.
        let registry = MatcherRegistry::default();
        let config = config(&[
            ("Name", 0.5, Some(MatchStrategy::Fuzzy)),
            ("Email", 0.8, None),
            ("Phone", 0.6, None),
        ]);
        let a = record(
            "a",
            &[
                ("Name", "Jonathan Smith"),
                ("Email", "jon@acme.test"),
                ("Phone", "555-0100"),
            ],
        );
        let b = record(
            "b",
            &[
                ("Name", "Jonathon Smith"),
                ("Email", "jon@acme.test"),
                ("Phone", ""),
            ],
        );
        let score = score_pair(&a, &b, &config, &registry).unwrap();
        let name_score = score.field_scores["Name"];
        assert!(name_score > 0.9);
        assert_eq!(score.field_scores["Email"], 1.0);
        assert_eq!(score.field_scores["Phone"], 0.0);
        let expected = (0.5 * name_score + 0.8) / 1.3;
        assert!((score.aggregate - expected).abs() < 1e-9);
        assert!(score.aggregate > 0.95, "got {}", score.aggregate);
        assert!(score.is_match(0.75));
    }

    #[test]
    fn one_side_blank_field_does_not_dilute_the_mean() {
        let registry = MatcherRegistry::default();
        let config = config(&[("Email", 0.8, None), ("Phone", 0.6, None)]);
        let a = record("a", &[("Email", "jon@acme.test"), ("Phone", "555-0100")]);
        let b = record("b", &[("Email", "jon@acme.test")]);
        let score = score_pair(&a, &b, &config, &registry).unwrap();
        // Phone shows up in the audit trail as 0 but the aggregate is the
        // email score alone.
        assert_eq!(score.field_scores["Phone"], 0.0);
        assert_eq!(score.aggregate, 1.0);
    }

    #[test]
    fn every_field_one_side_blank_scores_zero() {
        let registry = MatcherRegistry::default();
        let config = config(&[("Name", 1.0, None)]);
        let a = record("a", &[("Name", "Acme")]);
        let b = record("b", &[]);
        let score = score_pair(&a, &b, &config, &registry).unwrap();
        assert_eq!(score.aggregate, 0.0);
        assert_eq!(score.field_scores["Name"], 0.0);
    }

    #[test]
    fn both_blank_field_excluded_from_denominator() {
        let registry = MatcherRegistry::default();
        let config = config(&[("Email", 0.8, None), ("Phone", 0.6, None)]);
        let a = record("a", &[("Email", "jon@acme.test")]);
        let b = record("b", &[("Email", "jon@acme.test"), ("Phone", "  ")]);
        let score = score_pair(&a, &b, &config, &registry).unwrap();
        // Phone blank on both sides: aggregate is the email score alone.
        assert_eq!(score.aggregate, 1.0);
        assert!(!score.field_scores.contains_key("Phone"));
    }

    #[test]
    fn all_fields_blank_scores_zero() {
        let registry = MatcherRegistry::default();
        let config = config(&[("Name", 1.0, None)]);
        let a = record("a", &[]);
        let b = record("b", &[]);
        let score = score_pair(&a, &b, &config, &registry).unwrap();
        assert_eq!(score.aggregate, 0.0);
    }

    #[test]
    fn empty_config_is_a_configuration_error() {
        let registry = MatcherRegistry::default();
        let config = config(&[]);
        let a = record("a", &[("Name", "Acme")]);
        let b = record("b", &[("Name", "Acme")]);
        assert_eq!(
            score_pair(&a, &b, &config, &registry),
            Err(ConfigError::NoUsableFields)
        );
    }

    #[test]
    fn unconfigured_fields_are_ignored() {
        let registry = MatcherRegistry::default();
        let config = config(&[("Name", 1.0, None)]);
        let a = record("a", &[("Name", "Acme"), ("Notes", "call later")]);
        let b = record("b", &[("Name", "Acme"), ("Notes", "totally different")]);
        let score = score_pair(&a, &b, &config, &registry).unwrap();
        assert_eq!(score.aggregate, 1.0);
    }
}
