//! Address-aware matching over street/city/postal subfields.

use dedup_model::{FieldKind, FieldValue};

use crate::fuzzy::edit_similarity;
use crate::matcher::{BlankState, FieldMatcher, MatcherOptions, blank_state};
use crate::normalize::normalize_text;

/// Decomposes free-text addresses into street, city, and postal subfields
/// and aggregates the sub-scores with configurable intra-field weights.
///
/// Street and city compare fuzzily, postal codes exactly. Subfields blank
/// on both sides are excluded from the weighted mean, mirroring the pair
/// scorer's treatment of whole fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressMatcher;

/// Parsed subfields of an address string.
#[derive(Debug, Clone, Default, PartialEq)]
struct AddressParts {
    street: String,
    city: String,
    postal: String,
}

/// Splits on commas: first segment is the street, a trailing segment
/// containing a digit is the postal code, everything between is the city.
/// A single-segment address is treated as street only.
fn parse_address(raw: &str) -> AddressParts {
    let segments: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [] => AddressParts::default(),
        [street] => AddressParts {
            street: normalize_text(street),
            ..AddressParts::default()
        },
        [street, rest @ ..] => {
            let mut parts = AddressParts {
                street: normalize_text(street),
                ..AddressParts::default()
            };
            let mut middle = rest;
            if let [head @ .., last] = rest
                && last.chars().any(|c| c.is_ascii_digit())
            {
                parts.postal = normalize_text(last).replace(' ', "");
                middle = head;
            }
            parts.city = normalize_text(&middle.join(" "));
            parts
        }
    }
}

fn sub_score(a: &str, b: &str, fuzzy: bool) -> Option<f64> {
    match (a.is_empty(), b.is_empty()) {
        // Blank on both sides: no evidence, excluded from the mean
        (true, true) => None,
        (false, false) => Some(if fuzzy {
            edit_similarity(a, b)
        } else if a == b {
            1.0
        } else {
            0.0
        }),
        _ => Some(0.0),
    }
}

impl FieldMatcher for AddressMatcher {
    fn name(&self) -> &'static str {
        "address"
    }

    fn can_handle(&self, kind: FieldKind) -> bool {
        kind == FieldKind::Text
    }

    fn score(
        &self,
        a: Option<&FieldValue>,
        b: Option<&FieldValue>,
        options: &MatcherOptions,
    ) -> f64 {
        match blank_state(a, b) {
            BlankState::BothBlank => options.blank_pair_score,
            BlankState::OneBlank => 0.0,
            BlankState::BothPresent => match (a, b) {
                (Some(a), Some(b)) => {
                    let left = parse_address(&a.display_string());
                    let right = parse_address(&b.display_string());
                    let weights = options.address_weights;

                    let components = [
                        (sub_score(&left.street, &right.street, true), weights.street),
                        (sub_score(&left.city, &right.city, true), weights.city),
                        (sub_score(&left.postal, &right.postal, false), weights.postal),
                    ];

                    let mut numerator = 0.0;
                    let mut denominator = 0.0;
                    for (score, weight) in components {
                        if let Some(score) = score
                            && weight > 0.0
                        {
                            numerator += score * weight;
                            denominator += weight;
                        }
                    }
                    if denominator > 0.0 {
                        (numerator / denominator).clamp(0.0, 1.0)
                    } else {
                        0.0
                    }
                }
                _ => 0.0,
            },
        }
    }
}
