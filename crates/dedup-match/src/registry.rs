//! Capability lookup from configured strategy and field kind to a matcher.

use std::collections::BTreeMap;

use dedup_model::{FieldKind, MatchStrategy};

use crate::address::AddressMatcher;
use crate::distance::DistanceMatcher;
use crate::exact::ExactMatcher;
use crate::fuzzy::FuzzyMatcher;
use crate::matcher::{FieldMatcher, MatcherOptions};
use crate::phonetic::PhoneticMatcher;

/// Resolves field configurations to matcher instances.
///
/// Resolution order: the explicit per-field strategy when configured, else
/// a default inferred from the field's runtime kind. Unknown custom names,
/// unsupported kinds, and strategy/kind mismatches all fall back to exact
/// matching on stringified values. Built once per batch, never per
/// comparison.
pub struct MatcherRegistry {
    exact: ExactMatcher,
    fuzzy: FuzzyMatcher,
    phonetic: PhoneticMatcher,
    distance: DistanceMatcher,
    custom: BTreeMap<String, Box<dyn FieldMatcher>>,
    options: MatcherOptions,
}

impl MatcherRegistry {
    pub fn new(options: MatcherOptions) -> Self {
        let mut registry = Self {
            exact: ExactMatcher,
            fuzzy: FuzzyMatcher,
            phonetic: PhoneticMatcher,
            distance: DistanceMatcher,
            custom: BTreeMap::new(),
            options,
        };
        // The address matcher has no strategy variant of its own; it is
        // selected per field via `custom: "address"`.
        registry.register("address", Box::new(AddressMatcher));
        registry
    }

    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Registers a caller-supplied matcher reachable via
    /// `MatchStrategy::Custom(name)`.
    pub fn register(&mut self, name: impl Into<String>, matcher: Box<dyn FieldMatcher>) {
        self.custom.insert(name.into(), matcher);
    }

    /// Resolves the matcher for one field.
    ///
    /// `kind` is the runtime kind of whichever side carries a value; `None`
    /// only happens for fields absent on both records, which the scorer
    /// excludes before resolution.
    pub fn resolve(
        &self,
        strategy: Option<&MatchStrategy>,
        kind: Option<FieldKind>,
    ) -> &dyn FieldMatcher {
        let matcher: &dyn FieldMatcher = match strategy {
            Some(MatchStrategy::Exact) => &self.exact,
            Some(MatchStrategy::Fuzzy) => &self.fuzzy,
            Some(MatchStrategy::Phonetic) => &self.phonetic,
            Some(MatchStrategy::Distance) => &self.distance,
            Some(MatchStrategy::Custom(name)) => match self.custom.get(name) {
                Some(custom) => custom.as_ref(),
                None => &self.exact,
            },
            None => match kind {
                Some(FieldKind::Number | FieldKind::Date) => &self.distance,
                Some(FieldKind::Text | FieldKind::Boolean) | None => &self.exact,
            },
        };
        match kind {
            Some(kind) if !matcher.can_handle(kind) => &self.exact,
            _ => matcher,
        }
    }

    /// Names and handled kinds of the built-in matchers, for CLI listings.
    pub fn builtin_summaries() -> Vec<(&'static str, &'static str)> {
        vec![
            ("exact", "text, number, boolean, date (fallback)"),
            ("fuzzy", "text"),
            ("phonetic", "text"),
            ("distance", "number, date"),
            ("address", "text"),
        ]
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::new(MatcherOptions::default())
    }
}
