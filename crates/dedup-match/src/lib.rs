//! Field matchers, matcher registry, and pairwise match scoring.
//!
//! Matchers are pure functions scoring the similarity of one field's
//! values between two records. The registry resolves each configured field
//! to a matcher once per batch; `score_pair` aggregates per-field scores
//! into one normalized duplicate-likelihood value.

pub mod address;
pub mod distance;
pub mod exact;
pub mod fuzzy;
pub mod matcher;
pub mod normalize;
pub mod phonetic;
pub mod registry;
pub mod scorer;

pub use address::AddressMatcher;
pub use distance::DistanceMatcher;
pub use exact::ExactMatcher;
pub use fuzzy::FuzzyMatcher;
pub use matcher::{AddressWeights, FieldMatcher, MatcherOptions};
pub use phonetic::{PhoneticMatcher, soundex};
pub use registry::MatcherRegistry;
pub use scorer::score_pair;
