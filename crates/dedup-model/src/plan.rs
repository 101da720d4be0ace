//! Merge plans, field conflicts, and the audit artifact built from them.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, RecordId};

/// A field where the master and a duplicate disagree on non-blank values
/// and no explicit override chose a side.
///
/// Every conflict must be surfaced in the plan; silently dropping a field
/// value is a contract violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConflict {
    pub field: String,
    pub master_value: FieldValue,
    pub duplicate_value: FieldValue,
    pub duplicate_record_id: RecordId,
}

/// The computed outcome of merging one duplicate group.
///
/// Immutable once produced; the external merge-execution collaborator
/// applies it to storage. `resolved_fields` always contains an entry for
/// every field seen across master and duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergePlan {
    pub master_id: RecordId,
    /// Duplicates in the order they were presented to the resolver.
    pub duplicate_ids: Vec<RecordId>,
    pub resolved_fields: BTreeMap<String, FieldValue>,
    pub conflicts: Vec<FieldConflict>,
    /// Manual per-field overrides that were applied, field -> source record.
    pub overrides_applied: BTreeMap<String, RecordId>,
}

impl MergePlan {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// One alternative value preserved for a conflicted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeValue {
    pub value: FieldValue,
    pub source_record_id: RecordId,
}

/// All alternatives recorded for one conflicted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictEntry {
    pub field: String,
    pub master_value: FieldValue,
    pub alternatives: Vec<AlternativeValue>,
}

/// The audit artifact consumed by the notes collaborator.
///
/// Groups a plan's conflicts per field so they can be rendered as a
/// human-readable note attached to the merged master record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConflictReport {
    pub entries: Vec<ConflictEntry>,
}

impl ConflictReport {
    /// Builds the per-field audit view from a plan's conflict list.
    pub fn from_plan(plan: &MergePlan) -> Self {
        let mut by_field: BTreeMap<&str, ConflictEntry> = BTreeMap::new();
        for conflict in &plan.conflicts {
            let entry = by_field
                .entry(conflict.field.as_str())
                .or_insert_with(|| ConflictEntry {
                    field: conflict.field.clone(),
                    master_value: conflict.master_value.clone(),
                    alternatives: Vec::new(),
                });
            entry.alternatives.push(AlternativeValue {
                value: conflict.duplicate_value.clone(),
                source_record_id: conflict.duplicate_record_id.clone(),
            });
        }
        Self {
            entries: by_field.into_values().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the report as text suitable for a merge audit note.
    pub fn render_audit_note(&self) -> String {
        if self.entries.is_empty() {
            return "No field conflicts detected during merge.".to_string();
        }
        let mut note = String::from("Field conflicts preserved during merge:\n");
        for entry in &self.entries {
            let _ = writeln!(
                note,
                "- {}: kept '{}'",
                entry.field,
                entry.master_value.display_string()
            );
            for alternative in &entry.alternatives {
                let _ = writeln!(
                    note,
                    "    discarded '{}' (from record {})",
                    alternative.value.display_string(),
                    alternative.source_record_id
                );
            }
        }
        note
    }
}
