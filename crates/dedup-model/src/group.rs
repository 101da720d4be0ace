//! Duplicate groups produced by the grouping engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// Identifier of a duplicate group within one batch run.
///
/// Derived deterministically from the smallest member record id, so
/// identical input pages always produce identical group ids.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GroupId(String);

impl GroupId {
    /// Builds the group id from the smallest member record id.
    pub fn from_smallest_member(record_id: &RecordId) -> Self {
        Self(format!("grp-{record_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A maximal transitively-connected cluster of matched records.
///
/// Invariants: at least two members, members sorted by record id, and no
/// record belongs to two groups within a single grouping call. The master
/// is assigned by master selection after grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub id: GroupId,
    pub record_ids: Vec<RecordId>,
    pub master_id: Option<RecordId>,
}

impl DuplicateGroup {
    /// Creates a group from sorted member ids. Callers guarantee `members`
    /// is sorted and has at least two entries.
    pub fn new(members: Vec<RecordId>) -> Self {
        debug_assert!(members.len() >= 2);
        debug_assert!(members.windows(2).all(|pair| pair[0] < pair[1]));
        let id = GroupId::from_smallest_member(&members[0]);
        Self {
            id,
            record_ids: members,
            master_id: None,
        }
    }

    pub fn len(&self) -> usize {
        self.record_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_ids.is_empty()
    }

    pub fn contains(&self, record_id: &RecordId) -> bool {
        self.record_ids.binary_search(record_id).is_ok()
    }

    /// Member ids excluding the assigned master, in sorted order.
    pub fn duplicate_ids(&self) -> Vec<RecordId> {
        match &self.master_id {
            Some(master) => self
                .record_ids
                .iter()
                .filter(|id| *id != master)
                .cloned()
                .collect(),
            None => self.record_ids.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_is_deterministic() {
        let members = vec![RecordId::from("a1"), RecordId::from("b2")];
        let group = DuplicateGroup::new(members.clone());
        let again = DuplicateGroup::new(members);
        assert_eq!(group.id, again.id);
        assert_eq!(group.id.as_str(), "grp-a1");
    }

    #[test]
    fn duplicate_ids_exclude_master() {
        let mut group = DuplicateGroup::new(vec![
            RecordId::from("a"),
            RecordId::from("b"),
            RecordId::from("c"),
        ]);
        group.master_id = Some(RecordId::from("b"));
        assert_eq!(
            group.duplicate_ids(),
            vec![RecordId::from("a"), RecordId::from("c")]
        );
    }
}
