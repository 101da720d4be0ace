//! Duplicate grouping: transitive clustering of scored record pairs.

pub mod engine;
pub mod union_find;

pub use engine::{BlockingKeyFn, GroupingOutcome, group_records};
pub use union_find::UnionFind;
