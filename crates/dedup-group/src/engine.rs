//! Clustering of scored record pairs into duplicate groups.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use dedup_match::{MatcherRegistry, score_pair};
use dedup_model::{CandidateRecord, ConfigError, DuplicateGroup, MatchConfig, RecordId};

use crate::union_find::UnionFind;

/// Optional pre-blocking hook supplied by the batch orchestrator.
///
/// Records sharing a blocking key (normalized last name, postal code, ...)
/// are compared pairwise; records mapped to `None` are excluded from
/// comparison entirely. Without a hook, every pair within the current page
/// is compared, never pairs across pages.
pub type BlockingKeyFn<'a> = dyn Fn(&CandidateRecord) -> Option<String> + 'a;

/// Result of grouping one page of records.
#[derive(Debug, Clone, Default)]
pub struct GroupingOutcome {
    /// Duplicate groups, sorted by group id. Singletons are discarded.
    pub groups: Vec<DuplicateGroup>,
    /// Pairs actually scored (after blocking).
    pub pairs_scored: usize,
    /// Pairs at or above the match threshold.
    pub pairs_matched: usize,
    /// Transitive groups dropped by the `max_group_size` safety valve.
    pub oversized_groups: usize,
}

impl GroupingOutcome {
    /// Non-master records across all groups: each group keeps one master,
    /// every other member is a duplicate.
    pub fn duplicates_found(&self) -> usize {
        self.groups
            .iter()
            .map(|group| group.len().saturating_sub(1))
            .sum()
    }
}

/// Groups a page of records into duplicate clusters.
///
/// Pairs scoring at or above `config.threshold` are unioned; after all
/// unions, each disjoint set of size >= 2 becomes one group. Grouping is
/// transitive by design: two records linked only through an intermediate
/// record land in the same group even when their direct score is below the
/// threshold. The union-find structure lives for this call only.
pub fn group_records(
    records: &[CandidateRecord],
    config: &MatchConfig,
    registry: &MatcherRegistry,
    blocking: Option<&BlockingKeyFn<'_>>,
) -> Result<GroupingOutcome, ConfigError> {
    config.validate()?;

    let blocks = build_blocks(records, blocking);
    let mut uf = UnionFind::new(records.len());
    let mut pairs_scored = 0usize;
    let mut pairs_matched = 0usize;

    for indices in blocks.values() {
        for (position, &i) in indices.iter().enumerate() {
            for &j in &indices[position + 1..] {
                let score = score_pair(&records[i], &records[j], config, registry)?;
                pairs_scored += 1;
                if score.is_match(config.threshold) {
                    pairs_matched += 1;
                    uf.union(i, j);
                }
            }
        }
    }

    let mut members_by_root: BTreeMap<usize, Vec<RecordId>> = BTreeMap::new();
    for index in 0..records.len() {
        let root = uf.find(index);
        members_by_root
            .entry(root)
            .or_default()
            .push(records[index].id.clone());
    }

    let mut groups = Vec::new();
    let mut oversized_groups = 0usize;
    for (_, mut members) in members_by_root {
        if members.len() < 2 {
            continue;
        }
        if let Some(cap) = config.max_group_size
            && members.len() > cap
        {
            oversized_groups += 1;
            warn!(
                size = members.len(),
                cap, "dropping oversized transitive group"
            );
            continue;
        }
        members.sort();
        groups.push(DuplicateGroup::new(members));
    }
    groups.sort_by(|a, b| a.id.cmp(&b.id));

    debug!(
        records = records.len(),
        pairs_scored,
        pairs_matched,
        groups = groups.len(),
        "page grouped"
    );

    Ok(GroupingOutcome {
        groups,
        pairs_scored,
        pairs_matched,
        oversized_groups,
    })
}

/// Partitions record indices by blocking key; a single block covers the
/// whole page when no hook is supplied.
fn build_blocks(
    records: &[CandidateRecord],
    blocking: Option<&BlockingKeyFn<'_>>,
) -> BTreeMap<String, Vec<usize>> {
    let mut blocks: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    match blocking {
        None => {
            blocks.insert(String::new(), (0..records.len()).collect());
        }
        Some(key_fn) => {
            for (index, record) in records.iter().enumerate() {
                if let Some(key) = key_fn(record) {
                    blocks.entry(key).or_default().push(index);
                }
            }
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dedup_model::{FieldRule, FieldValue, MatchStrategy};

    fn record(id: &str, name: &str) -> CandidateRecord {
        CandidateRecord::new(id, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .with_field("Name", FieldValue::Text(name.into()))
    }

    fn fuzzy_config(threshold: f64) -> MatchConfig {
        let mut fields = BTreeMap::new();
        fields.insert(
            "Name".to_string(),
            FieldRule::weighted(1.0).with_strategy(MatchStrategy::Fuzzy),
        );
        let mut config = MatchConfig::new(fields);
        config.threshold = threshold;
        config
    }

    #[test]
    fn groups_identical_names() {
        let registry = MatcherRegistry::default();
        let records = vec![
            record("a", "Acme Corp"),
            record("b", "Acme Corp"),
            record("c", "Globex"),
        ];
        let outcome =
            group_records(&records, &fuzzy_config(0.9), &registry, None).unwrap();
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].record_ids.len(), 2);
        assert_eq!(outcome.duplicates_found(), 1);
    }

    #[test]
    fn singletons_are_discarded() {
        let registry = MatcherRegistry::default();
        let records = vec![record("a", "Alpha"), record("b", "Omega")];
        let outcome =
            group_records(&records, &fuzzy_config(0.9), &registry, None).unwrap();
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.pairs_scored, 1);
        assert_eq!(outcome.pairs_matched, 0);
    }

    #[test]
    fn blocking_prevents_cross_block_comparison() {
        let registry = MatcherRegistry::default();
        let records = vec![record("a", "Acme Corp"), record("b", "Acme Corp")];
        let by_id: &BlockingKeyFn<'_> = &|record: &CandidateRecord| {
            Some(record.id.as_str().to_string())
        };
        let outcome =
            group_records(&records, &fuzzy_config(0.9), &registry, Some(by_id)).unwrap();
        // Each record is alone in its block, so nothing is ever compared.
        assert_eq!(outcome.pairs_scored, 0);
        assert!(outcome.groups.is_empty());
    }

    #[test]
    fn records_without_blocking_key_are_skipped() {
        let registry = MatcherRegistry::default();
        let records = vec![record("a", "Acme Corp"), record("b", "Acme Corp")];
        let none_key: &BlockingKeyFn<'_> = &|_: &CandidateRecord| None;
        let outcome =
            group_records(&records, &fuzzy_config(0.9), &registry, Some(none_key))
                .unwrap();
        assert_eq!(outcome.pairs_scored, 0);
    }

    #[test]
    fn max_group_size_drops_oversized_groups() {
        let registry = MatcherRegistry::default();
        let records = vec![
            record("a", "Acme Corp"),
            record("b", "Acme Corp"),
            record("c", "Acme Corp"),
        ];
        let mut config = fuzzy_config(0.9);
        config.max_group_size = Some(2);
        let outcome = group_records(&records, &config, &registry, None).unwrap();
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.oversized_groups, 1);
    }
}
