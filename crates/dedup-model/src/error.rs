use thiserror::Error;

/// Errors raised while validating or using a match configuration.
///
/// Configuration errors are fatal to a job: they are surfaced immediately
/// and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The configuration has no field with a positive weight.
    #[error("match configuration has no usable fields (all weights missing or non-positive)")]
    NoUsableFields,
    /// A field weight is negative or not finite.
    #[error("invalid weight {weight} for field '{field}'")]
    InvalidWeight { field: String, weight: f64 },
    /// The match threshold is outside [0, 1].
    #[error("match threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    /// The page size is zero.
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    /// The blank-pair neutral score is outside [0, 1].
    #[error("blank-pair score must be within [0, 1], got {0}")]
    InvalidBlankPairScore(f64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
