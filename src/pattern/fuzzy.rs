//! Fuzzy character-equivalence classes.
//!
//! The tables here are frozen as part of the protocol (spec §4.3, §9
//! open question #1): changing them would change which fingerprints a
//! previously-compiled pattern matches, breaking reproducibility between
//! implementations.

use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// A fuzzy equivalence class applied when matching pattern substrings
/// against a fingerprint's searchable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyMode {
    /// No fuzzy expansion; characters must match literally.
    None,
    /// `O<->0, I<->1, E<->3, A<->4, S<->5, T<->7, B<->8`.
    Leetspeak,
    /// `0<->O<->Q`, `1<->I<->l`.
    Homoglyph,
    /// Pronunciation-equivalent groups. Not implemented; requesting it
    /// is a hard construction-time error (spec §9 open question #2).
    Phonetic,
}

/// Canonical leetspeak classes: (canonical lowercase letter, digit form).
const LEETSPEAK_TABLE: &[(char, char)] = &[
    ('o', '0'),
    ('i', '1'),
    ('e', '3'),
    ('a', '4'),
    ('s', '5'),
    ('t', '7'),
    ('b', '8'),
];

/// Frozen homoglyph classes, each a set of visually similar glyphs.
const HOMOGLYPH_TABLE: &[&[char]] = &[&['0', 'o', 'q'], &['1', 'i', 'l']];

/// Expand a single pattern character into its equivalence class under
/// `fuzzy`, preserving the case domain the caller is already working in
/// (the caller is responsible for having lowered both the view and the
/// pattern beforehand when matching case-insensitively).
///
/// Returns `Ok(vec![ch])` when `ch` has no equivalents (or fuzzy is
/// `None`); the vector always contains at least `ch` itself.
pub(super) fn equivalents(fuzzy: FuzzyMode, ch: char) -> Result<Vec<char>, PatternError> {
    match fuzzy {
        FuzzyMode::None => Ok(vec![ch]),
        FuzzyMode::Phonetic => Err(PatternError::UnsupportedFuzzyMode),
        FuzzyMode::Leetspeak => Ok(leetspeak_equivalents(ch)),
        FuzzyMode::Homoglyph => Ok(homoglyph_equivalents(ch)),
    }
}

fn leetspeak_equivalents(ch: char) -> Vec<char> {
    let lower = ch.to_ascii_lowercase();
    for &(letter, digit) in LEETSPEAK_TABLE {
        if lower == letter {
            return with_matched_case(ch, letter, digit);
        }
        if ch == digit {
            return with_matched_case(ch, letter, digit);
        }
    }
    vec![ch]
}

/// Build the two-member equivalence class, keeping the letter in the
/// same case as `ch` when `ch` is alphabetic (digits have no case).
fn with_matched_case(ch: char, canonical_letter: char, digit: char) -> Vec<char> {
    let letter = if ch.is_ascii_uppercase() {
        canonical_letter.to_ascii_uppercase()
    } else {
        canonical_letter
    };
    vec![letter, digit]
}

fn homoglyph_equivalents(ch: char) -> Vec<char> {
    let lower = ch.to_ascii_lowercase();
    for class in HOMOGLYPH_TABLE {
        if class.contains(&lower) {
            return class.to_vec();
        }
    }
    vec![ch]
}


/// Normalize a leetspeak-fuzzed string to its canonical letter form,
/// e.g. `"B00M"` -> `"BOOM"` (spec §4.3: "canonical-form rule").
///
/// Case of replacement letters follows the case of the surrounding
/// alphabetic characters in `text` (uppercase if any are uppercase,
/// lowercase otherwise).
pub fn canonicalize_leetspeak(text: &str) -> String {
    let prefer_upper = text.chars().any(|c| c.is_ascii_uppercase());
    text.chars()
        .map(|ch| {
            for &(letter, digit) in LEETSPEAK_TABLE {
                if ch == digit {
                    return if prefer_upper {
                        letter.to_ascii_uppercase()
                    } else {
                        letter
                    };
                }
            }
            ch
        })
        .collect()
}
