pub mod config;
pub mod error;
pub mod group;
pub mod job;
pub mod plan;
pub mod record;
pub mod score;

pub use config::{FieldRule, MasterStrategy, MatchConfig, MatchStrategy};
pub use error::ConfigError;
pub use group::{DuplicateGroup, GroupId};
pub use job::{JobId, JobNote, JobRunState, JobStatus};
pub use plan::{AlternativeValue, ConflictEntry, ConflictReport, FieldConflict, MergePlan};
pub use record::{CandidateRecord, FieldKind, FieldValue, RecordId};
pub use score::PairScore;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn config_json_defaults_apply() {
        let json = r#"{"fields":{"Name":{"weight":0.5}}}"#;
        let config: MatchConfig = serde_json::from_str(json).expect("parse config");
        assert_eq!(config.threshold, 0.75);
        assert_eq!(config.master_strategy, MasterStrategy::OldestCreated);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn pair_score_threshold_check() {
        let score = PairScore {
            record_a: RecordId::from("a"),
            record_b: RecordId::from("b"),
            field_scores: BTreeMap::new(),
            aggregate: 0.76,
        };
        assert!(score.is_match(0.75));
        assert!(!score.is_match(0.8));
    }
}
