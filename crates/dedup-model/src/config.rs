//! Match configuration: field weights, matcher strategies, and thresholds.
//!
//! Configurations are serialized as JSON by callers that persist them; the
//! engine only validates and reads them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Matcher selection for a configured field.
///
/// `Custom` names a matcher registered by the caller; unknown names fall
/// back to exact matching on stringified values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    Exact,
    Fuzzy,
    Phonetic,
    Distance,
    Custom(String),
}

/// Strategy for choosing the surviving master record of a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterStrategy {
    /// Minimum creation timestamp; ties broken by smallest record id.
    #[default]
    OldestCreated,
    /// Maximum creation timestamp; ties broken by smallest record id.
    NewestCreated,
    /// Highest count of non-blank configured fields; ties broken by the
    /// `OldestCreated` rule.
    MostComplete,
}

/// Weight and optional matcher override for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Relative weight, typically 0-1. Weights need not sum to 1; they are
    /// normalized at scoring time.
    pub weight: f64,
    /// Explicit matcher strategy. When absent the registry infers a default
    /// from the field's runtime type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<MatchStrategy>,
}

impl FieldRule {
    pub fn weighted(weight: f64) -> Self {
        Self {
            weight,
            strategy: None,
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

fn default_threshold() -> f64 {
    0.75
}

fn default_page_size() -> usize {
    200
}

/// Full configuration of a deduplication run.
///
/// A field absent from `fields` is excluded from scoring entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Per-field weights and matcher overrides.
    pub fields: BTreeMap<String, FieldRule>,
    /// Aggregate score at or above which a pair is considered a duplicate.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Master selection strategy for each duplicate group.
    #[serde(default)]
    pub master_strategy: MasterStrategy,
    /// Records fetched per repository page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Neutral score when both sides of a field are blank. Blank/blank
    /// carries no evidence, so the default is 0.
    #[serde(default)]
    pub blank_pair_score: f64,
    /// Optional safety valve: transitive groups larger than this are
    /// dropped from grouping output instead of merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_group_size: Option<usize>,
}

impl MatchConfig {
    pub fn new(fields: BTreeMap<String, FieldRule>) -> Self {
        Self {
            fields,
            threshold: default_threshold(),
            master_strategy: MasterStrategy::default(),
            page_size: default_page_size(),
            blank_pair_score: 0.0,
            max_group_size: None,
        }
    }

    /// Field names that participate in scoring, in deterministic order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Checks the configuration invariants.
    ///
    /// A usable configuration has at least one positively-weighted field, a
    /// threshold and blank-pair score within [0, 1], and a non-zero page
    /// size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, rule) in &self.fields {
            if !rule.weight.is_finite() || rule.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    field: field.clone(),
                    weight: rule.weight,
                });
            }
        }
        if !self.fields.values().any(|rule| rule.weight > 0.0) {
            return Err(ConfigError::NoUsableFields);
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if !(0.0..=1.0).contains(&self.blank_pair_score) {
            return Err(ConfigError::InvalidBlankPairScore(self.blank_pair_score));
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        Ok(())
    }
}
