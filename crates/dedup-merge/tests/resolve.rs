//! End-to-end resolution scenarios for merge planning.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{TimeZone, Utc};

use dedup_merge::{build_conflict_report, resolve, select_master};
use dedup_model::{CandidateRecord, FieldValue, MasterStrategy, RecordId};

fn record(id: &str, day: u32) -> CandidateRecord {
    CandidateRecord::new(id, Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap())
}

/// Master says "NYC", duplicate says "New York": the master value is kept
/// and the duplicate value survives as a conflict instead of vanishing.
#[test]
fn disagreeing_city_is_preserved_as_conflict() {
    let master = record("m", 1).with_field("BillingCity", FieldValue::Text("NYC".into()));
    let dup =
        record("d", 2).with_field("BillingCity", FieldValue::Text("New York".into()));

    let plan = resolve(&master, &[&dup], &BTreeMap::new()).unwrap();

    assert_eq!(
        plan.resolved_fields["BillingCity"],
        FieldValue::Text("NYC".into())
    );
    assert_eq!(plan.conflicts.len(), 1);
    let conflict = &plan.conflicts[0];
    assert_eq!(conflict.field, "BillingCity");
    assert_eq!(conflict.duplicate_value, FieldValue::Text("New York".into()));
    assert_eq!(conflict.duplicate_record_id, RecordId::from("d"));
}

#[test]
fn blank_master_field_is_filled_without_conflict() {
    let master = record("m", 1)
        .with_field("Name", FieldValue::Text("Acme".into()))
        .with_field("Phone", FieldValue::Text("  ".into()));
    let dup = record("d", 2)
        .with_field("Name", FieldValue::Text("Acme".into()))
        .with_field("Phone", FieldValue::Text("555-0100".into()));

    let plan = resolve(&master, &[&dup], &BTreeMap::new()).unwrap();

    assert_eq!(
        plan.resolved_fields["Phone"],
        FieldValue::Text("555-0100".into())
    );
    assert!(plan.conflicts.is_empty());
}

/// With a blank master field and several distinct duplicate values, the
/// earliest duplicate fills the gap and the rest become conflicts.
#[test]
fn blank_master_with_distinct_duplicates_keeps_first_and_records_rest() {
    let master = record("m", 1);
    let first = record("d1", 2).with_field("Phone", FieldValue::Text("555-0100".into()));
    let second =
        record("d2", 3).with_field("Phone", FieldValue::Text("555-0199".into()));

    let plan = resolve(&master, &[&first, &second], &BTreeMap::new()).unwrap();

    assert_eq!(
        plan.resolved_fields["Phone"],
        FieldValue::Text("555-0100".into())
    );
    assert_eq!(plan.conflicts.len(), 1);
    assert_eq!(plan.conflicts[0].duplicate_record_id, RecordId::from("d2"));
    assert_eq!(
        plan.conflicts[0].master_value,
        FieldValue::Text("555-0100".into())
    );
}

#[test]
fn every_field_seen_across_the_group_is_resolved() {
    let master = record("m", 1).with_field("Name", FieldValue::Text("Acme".into()));
    let dup_a = record("d1", 2).with_field("Email", FieldValue::Text("a@acme.test".into()));
    let dup_b = record("d2", 3).with_field("Employees", FieldValue::Number(12.0));

    let plan = resolve(&master, &[&dup_a, &dup_b], &BTreeMap::new()).unwrap();

    let resolved: BTreeSet<&str> =
        plan.resolved_fields.keys().map(String::as_str).collect();
    assert_eq!(resolved, BTreeSet::from(["Email", "Employees", "Name"]));
}

#[test]
fn override_picks_the_duplicate_value_without_conflict() {
    let master = record("m", 1).with_field("City", FieldValue::Text("NYC".into()));
    let dup = record("d", 2).with_field("City", FieldValue::Text("New York".into()));
    let overrides = BTreeMap::from([("City".to_string(), RecordId::from("d"))]);

    let plan = resolve(&master, &[&dup], &overrides).unwrap();

    assert_eq!(
        plan.resolved_fields["City"],
        FieldValue::Text("New York".into())
    );
    assert!(plan.conflicts.is_empty());
    assert_eq!(plan.overrides_applied["City"], RecordId::from("d"));
}

/// Resolving the same inputs twice yields byte-identical plans.
#[test]
fn resolution_is_deterministic() {
    let master = record("m", 1).with_field("City", FieldValue::Text("NYC".into()));
    let dup_a = record("d1", 2).with_field("City", FieldValue::Text("New York".into()));
    let dup_b = record("d2", 3).with_field("City", FieldValue::Text("N.Y.C.".into()));

    let first = resolve(&master, &[&dup_a, &dup_b], &BTreeMap::new()).unwrap();
    let second = resolve(&master, &[&dup_a, &dup_b], &BTreeMap::new()).unwrap();

    assert_eq!(first, second);
    let json_first = serde_json::to_string(&first).unwrap();
    let json_second = serde_json::to_string(&second).unwrap();
    assert_eq!(json_first, json_second);
}

#[test]
fn selection_then_resolution_round_trip() {
    let records = vec![
        record("newer", 9).with_field("Name", FieldValue::Text("Acme Corp".into())),
        record("older", 1).with_field("Name", FieldValue::Text("Acme".into())),
    ];
    let master =
        select_master(&records, MasterStrategy::OldestCreated, &["Name"]).unwrap();
    let duplicates: Vec<&CandidateRecord> =
        records.iter().filter(|r| r.id != master.id).collect();

    let plan = resolve(master, &duplicates, &BTreeMap::new()).unwrap();

    assert_eq!(plan.master_id, RecordId::from("older"));
    assert_eq!(plan.duplicate_ids, vec![RecordId::from("newer")]);
    assert_eq!(plan.conflicts.len(), 1);
}

#[test]
fn audit_note_snapshot() {
    let master = record("m", 1).with_field("BillingCity", FieldValue::Text("NYC".into()));
    let dup_a =
        record("d1", 2).with_field("BillingCity", FieldValue::Text("New York".into()));
    let dup_b = record("d2", 3)
        .with_field("BillingCity", FieldValue::Text("New York City".into()));

    let plan = resolve(&master, &[&dup_a, &dup_b], &BTreeMap::new()).unwrap();
    let note = build_conflict_report(&plan).render_audit_note();

    insta::assert_snapshot!(note, @r"
    Field conflicts preserved during merge:
    - BillingCity: kept 'NYC'
        discarded 'New York' (from record d1)
        discarded 'New York City' (from record d2)
    ");
}
