//! Merge resolution: computes a [`MergePlan`] without ever losing a value.
//!
//! The resolver keeps the master's non-blank values and records a
//! [`FieldConflict`] for every disagreeing duplicate instead of picking a
//! winner silently. Blank master fields are filled from duplicates. The
//! plan is a pure function of its inputs; applying it to storage is the
//! repository's job.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use dedup_model::{
    CandidateRecord, ConflictReport, FieldConflict, FieldValue, MergePlan, RecordId,
};

use crate::error::MergeError;

/// Groups a plan's conflicts per field into the audit artifact.
pub fn build_conflict_report(plan: &MergePlan) -> ConflictReport {
    ConflictReport::from_plan(plan)
}

/// Resolves one duplicate group into a merge plan.
///
/// `overrides` maps a field name to the record whose value must win for
/// that field; an override suppresses conflict recording for its field.
/// Every field seen on the master or any duplicate gets an entry in
/// `resolved_fields`.
pub fn resolve(
    master: &CandidateRecord,
    duplicates: &[&CandidateRecord],
    overrides: &BTreeMap<String, RecordId>,
) -> Result<MergePlan, MergeError> {
    if duplicates.is_empty() {
        return Err(MergeError::EmptyGroup(1));
    }
    if duplicates.iter().any(|dup| dup.id == master.id) {
        return Err(MergeError::InvalidMaster(master.id.clone()));
    }
    for source in overrides.values() {
        if *source != master.id && !duplicates.iter().any(|dup| dup.id == *source) {
            return Err(MergeError::InvalidMaster(source.clone()));
        }
    }

    let mut fields: BTreeSet<&str> = master.fields.keys().map(String::as_str).collect();
    for dup in duplicates {
        fields.extend(dup.fields.keys().map(String::as_str));
    }

    let mut resolved_fields = BTreeMap::new();
    let mut conflicts = Vec::new();
    let mut overrides_applied = BTreeMap::new();

    for field in fields {
        if let Some(source) = overrides.get(field)
            && let Some(value) = member(master, duplicates, source)
                .and_then(|record| record.non_blank_field(field))
        {
            resolved_fields.insert(field.to_string(), value.clone());
            overrides_applied.insert(field.to_string(), source.clone());
            continue;
        }

        match master.non_blank_field(field) {
            Some(kept) => {
                // Master wins; disagreeing duplicates become conflicts.
                for dup in duplicates {
                    if let Some(value) = dup.non_blank_field(field)
                        && !value.merge_eq(kept)
                    {
                        conflicts.push(FieldConflict {
                            field: field.to_string(),
                            master_value: kept.clone(),
                            duplicate_value: value.clone(),
                            duplicate_record_id: dup.id.clone(),
                        });
                    }
                }
                resolved_fields.insert(field.to_string(), kept.clone());
            }
            None => {
                resolved_fields
                    .insert(field.to_string(), fill_gap(master, duplicates, field, &mut conflicts));
            }
        }
    }

    debug!(
        master = %master.id,
        duplicates = duplicates.len(),
        conflicts = conflicts.len(),
        "merge plan resolved"
    );

    Ok(MergePlan {
        master_id: master.id.clone(),
        duplicate_ids: duplicates.iter().map(|dup| dup.id.clone()).collect(),
        resolved_fields,
        conflicts,
        overrides_applied,
    })
}

/// Fills a blank master field from the duplicates.
///
/// The earliest-presented non-blank duplicate value is adopted; any later
/// duplicate that disagrees with it is recorded as a conflict against the
/// adopted value. When every record is blank for the field, the first
/// value present is kept as-is.
fn fill_gap(
    master: &CandidateRecord,
    duplicates: &[&CandidateRecord],
    field: &str,
    conflicts: &mut Vec<FieldConflict>,
) -> FieldValue {
    let mut adopted: Option<&FieldValue> = None;
    for dup in duplicates {
        let Some(value) = dup.non_blank_field(field) else {
            continue;
        };
        match adopted {
            None => adopted = Some(value),
            Some(kept) => {
                if !value.merge_eq(kept) {
                    conflicts.push(FieldConflict {
                        field: field.to_string(),
                        master_value: kept.clone(),
                        duplicate_value: value.clone(),
                        duplicate_record_id: dup.id.clone(),
                    });
                }
            }
        }
    }
    if let Some(value) = adopted {
        return value.clone();
    }
    // All blank: keep whichever blank value exists so the field stays
    // represented in the plan.
    master
        .field(field)
        .or_else(|| duplicates.iter().find_map(|dup| dup.field(field)))
        .cloned()
        .unwrap_or_else(|| FieldValue::Text(String::new()))
}

fn member<'a>(
    master: &'a CandidateRecord,
    duplicates: &'a [&CandidateRecord],
    id: &RecordId,
) -> Option<&'a CandidateRecord> {
    if master.id == *id {
        return Some(master);
    }
    duplicates.iter().find(|dup| dup.id == *id).copied()
}
