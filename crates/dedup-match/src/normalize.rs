//! Text normalization shared by the matchers.

/// Normalizes text for comparison: trims, lowercases, collapses separators
/// and repeated whitespace into single spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
