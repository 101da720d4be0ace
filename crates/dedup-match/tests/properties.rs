//! Property tests for scorer symmetry, reflexivity, and range invariants.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use dedup_match::{MatcherRegistry, score_pair};
use dedup_model::{CandidateRecord, FieldRule, FieldValue, MatchConfig, MatchStrategy};

fn config() -> MatchConfig {
    let mut fields = BTreeMap::new();
    fields.insert(
        "Name".to_string(),
        FieldRule::weighted(0.5).with_strategy(MatchStrategy::Fuzzy),
    );
    fields.insert("Email".to_string(), FieldRule::weighted(0.8));
    fields.insert(
        "Age".to_string(),
        FieldRule::weighted(0.3).with_strategy(MatchStrategy::Distance),
    );
    MatchConfig::new(fields)
}

fn record(id: &str, name: &str, email: &str, age: Option<u8>) -> CandidateRecord {
    let mut record =
        CandidateRecord::new(id, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    record
        .fields
        .insert("Name".to_string(), FieldValue::Text(name.to_string()));
    record
        .fields
        .insert("Email".to_string(), FieldValue::Text(email.to_string()));
    if let Some(age) = age {
        record
            .fields
            .insert("Age".to_string(), FieldValue::Number(f64::from(age)));
    }
    record
}

proptest! {
    #[test]
    fn score_is_symmetric(
        name_a in "[a-z ]{0,12}",
        name_b in "[a-z ]{0,12}",
        email_a in "[a-z]{0,8}",
        email_b in "[a-z]{0,8}",
        age_a in proptest::option::of(0u8..120),
        age_b in proptest::option::of(0u8..120),
    ) {
        let registry = MatcherRegistry::default();
        let config = config();
        let a = record("a", &name_a, &email_a, age_a);
        let b = record("b", &name_b, &email_b, age_b);

        let forward = score_pair(&a, &b, &config, &registry).unwrap();
        let backward = score_pair(&b, &a, &config, &registry).unwrap();

        prop_assert_eq!(forward.field_scores, backward.field_scores);
        prop_assert!((forward.aggregate - backward.aggregate).abs() < 1e-12);
    }

    #[test]
    fn score_of_record_with_itself_is_one(
        name in "[a-z]{1,12}",
        email in "[a-z]{1,8}",
        age in 0u8..120,
    ) {
        let registry = MatcherRegistry::default();
        let config = config();
        let a = record("a", &name, &email, Some(age));

        let score = score_pair(&a, &a, &config, &registry).unwrap();
        prop_assert!((score.aggregate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn aggregate_stays_in_unit_interval(
        name_a in "[a-z0-9 ,._-]{0,16}",
        name_b in "[a-z0-9 ,._-]{0,16}",
    ) {
        let registry = MatcherRegistry::default();
        let config = config();
        let a = record("a", &name_a, "x", None);
        let b = record("b", &name_b, "y", None);

        let score = score_pair(&a, &b, &config, &registry).unwrap();
        prop_assert!((0.0..=1.0).contains(&score.aggregate));
        for value in score.field_scores.values() {
            prop_assert!((0.0..=1.0).contains(value));
        }
    }
}
