//! Soundex-based phonetic matching.

use dedup_model::{FieldKind, FieldValue};

use crate::fuzzy::edit_similarity;
use crate::matcher::{BlankState, FieldMatcher, MatcherOptions, blank_state};
use crate::normalize::normalize_text;

/// Compares Soundex encodings of the two values.
///
/// The score is binary (same encoding or not). When
/// `MatcherOptions::phonetic_blend` is set, edit-distance similarity is
/// blended in: `blend * distance + (1 - blend) * phonetic`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneticMatcher;

/// Soundex code of one word: first letter plus three digits, e.g.
/// "Robert" -> "R163". Empty input encodes to an empty string.
pub fn soundex(word: &str) -> String {
    let mut chars = word.chars().filter(|c| c.is_ascii_alphabetic());
    let Some(first) = chars.next() else {
        return String::new();
    };

    let digit = |c: char| -> Option<char> {
        match c.to_ascii_lowercase() {
            'b' | 'f' | 'p' | 'v' => Some('1'),
            'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
            'd' | 't' => Some('3'),
            'l' => Some('4'),
            'm' | 'n' => Some('5'),
            'r' => Some('6'),
            // Vowels plus h, w, y carry no code
            _ => None,
        }
    };

    let mut code = String::with_capacity(4);
    code.push(first.to_ascii_uppercase());
    let mut previous = digit(first);
    for c in chars {
        if code.len() >= 4 {
            break;
        }
        let current = digit(c);
        if let Some(d) = current
            && current != previous
        {
            code.push(d);
        }
        previous = current;
    }
    while code.len() < 4 {
        code.push('0');
    }
    code
}

/// Encodes every word of a phrase and joins the codes, so multi-word
/// values ("Jon Smith") compare word by word.
fn encode_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(soundex)
        .collect::<Vec<_>>()
        .join(" ")
}

impl FieldMatcher for PhoneticMatcher {
    fn name(&self) -> &'static str {
        "phonetic"
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
                    let left = normalize_text(&a.display_string());
                    let right = normalize_text(&b.display_string());
                    let phonetic = if encode_phrase(&left) == encode_phrase(&right) {
                        1.0
                    } else {
                        0.0
                    };
                    match options.phonetic_blend {
                        Some(blend) => {
                            let blend = blend.clamp(0.0, 1.0);
                            blend * edit_similarity(&left, &right) + (1.0 - blend) * phonetic
                        }
                        None => phonetic,
                    }
                }
                _ => 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.into())
    }

    #[test]
    fn classic_soundex_codes() {
        assert_eq!(soundex("Robert"), "R163");
        assert_eq!(soundex("Rupert"), "R163");
        assert_eq!(soundex("Smith"), "S530");
        assert_eq!(soundex("Smythe"), "S530");
        assert_eq!(soundex(""), "");
    }

    #[test]
    fn sound_alike_names_match() {
        let options = MatcherOptions::default();
        let score = PhoneticMatcher.score(
            Some(&text("Jon Smith")),
            Some(&text("John Smythe")),
            &options,
        );
        assert_eq!(score, 1.0);
    }

    #[test]
    fn different_sounds_do_not_match() {
        let options = MatcherOptions::default();
        let score = PhoneticMatcher.score(
            Some(&text("Smith")),
            Some(&text("Jones")),
            &options,
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn blend_mode_softens_binary_score() {
        let options = MatcherOptions {
            phonetic_blend: Some(0.5),
            ..MatcherOptions::default()
        };
        // "Smith" vs "Smile": phonetic 0 (S530 vs S540), but edit
        // similarity is 0.6, so the blended score sits between the two.
        let score =
            PhoneticMatcher.score(Some(&text("Smith")), Some(&text("Smile")), &options);
        assert!(score > 0.0 && score < 0.5, "got {score}");
    }
}
