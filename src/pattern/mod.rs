//! Pattern engine.
//!
//! Classifies and evaluates a pattern against a fingerprint's searchable
//! view: prefix / suffix / contains / regex / ordered multi-substring,
//! with optional fuzzy equivalence classes and case sensitivity.
//!
//! Match and fuzzy modes are closed tagged unions (spec §9): invalid
//! combinations, like regex with fuzzy, are unrepresentable because
//! [`PatternSpec::Regex`] simply has no `fuzzy` field.

pub mod fuzzy;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::PatternError;
pub use fuzzy::FuzzyMode;

const BASE64_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const MAX_SUBSTRING_LEN: usize = 20;
const LONG_MATCH_WARN_LEN: usize = 6;
const INFEASIBLE_WARN_LEN: usize = 7;

/// The shape of a pattern's match text, serialized as a tagged record
/// matching the proof wire format (spec §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PatternMode {
    Prefix { text: String },
    Suffix { text: String },
    Contains { text: String },
    Regex { text: String },
    MultiSubstring { substrings: Vec<String> },
}

/// Caller-supplied request to construct a [`Pattern`]. A closed union:
/// only `Regex` lacks a `fuzzy` field, so "regex with fuzzy" cannot be
/// expressed at all, let alone compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSpec {
    Prefix {
        text: String,
        fuzzy: FuzzyMode,
        case_sensitive: bool,
    },
    Suffix {
        text: String,
        fuzzy: FuzzyMode,
        case_sensitive: bool,
    },
    Contains {
        text: String,
        fuzzy: FuzzyMode,
        case_sensitive: bool,
    },
    Regex {
        text: String,
        case_sensitive: bool,
    },
    MultiSubstring {
        substrings: Vec<String>,
        fuzzy: FuzzyMode,
        case_sensitive: bool,
    },
}

/// One matched substring's position in the fingerprint's searchable
/// view. `index` identifies which pattern substring this is (always 0
/// for prefix/suffix/contains/regex); positions are half-open
/// `[start, end)` byte offsets (the view is ASCII, so byte == char).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPosition {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

/// The full set of positions justifying a pattern match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub positions: Vec<MatchPosition>,
}

/// Metadata the difficulty estimator needs, computed once at compile
/// time so the estimator stays a pure function of a `Pattern`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DifficultyMeta {
    pub total_matched_length: usize,
    /// Product, over every character in the pattern, of that character's
    /// fuzzy equivalence-class size (1 for a non-fuzzable character).
    /// Dividing expected attempts by this directly implements spec
    /// §4.4's "divide by m^f" rule without assuming every class has the
    /// same size m — Leetspeak's classes are 2-member, Homoglyph's are
    /// 3-member (`pattern/fuzzy.rs`'s `HOMOGLYPH_TABLE`).
    pub fuzzy_equivalence_product: f64,
    pub case_foldable_alpha_count: usize,
    pub substring_count: usize,
}

enum CompiledMatcher {
    Prefix(Box<Regex>),
    Suffix(Box<Regex>),
    Contains(Box<Regex>),
    Regex(Box<Regex>),
    MultiSubstring(Vec<Regex>),
}

/// A compiled, immutable pattern ready to be matched against
/// fingerprints.
pub struct Pattern {
    pub mode: PatternMode,
    pub fuzzy: FuzzyMode,
    pub case_sensitive: bool,
    compiled: CompiledMatcher,
    warnings: Vec<String>,
    pub(crate) difficulty_meta: DifficultyMeta,
}

impl Pattern {
    /// Non-fatal validation warnings collected at compile time (spec
    /// §4.3: total matched length thresholds for "slow" and "likely
    /// infeasible" searches).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The full wire-serializable description of this pattern (spec §6:
    /// "nested record with mode, substrings or text, fuzzy,
    /// case_sensitive"), for embedding in an order proof so a holder of
    /// only the proof can reconstruct exactly how it was matched.
    pub fn to_record(&self) -> PatternRecord {
        PatternRecord {
            mode: self.mode.clone(),
            fuzzy: self.fuzzy,
            case_sensitive: self.case_sensitive,
        }
    }
}

/// Self-contained wire form of a [`Pattern`]: its match mode and text
/// alongside the fuzzy mode and case sensitivity that are siblings of
/// `mode` in the wire record, not nested inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    #[serde(flatten)]
    pub mode: PatternMode,
    pub fuzzy: FuzzyMode,
    pub case_sensitive: bool,
}

/// Validate and compile a [`PatternSpec`] into a matchable [`Pattern`].
///
/// Returns every validation error found (not just the first), per
/// spec §4.3's "(errors, warnings)" contract.
pub fn compile_pattern(spec: PatternSpec) -> Result<Pattern, Vec<PatternError>> {
    let mut errors = Vec::new();

    match &spec {
        PatternSpec::Prefix {
            text,
            fuzzy,
            case_sensitive: _,
        }
        | PatternSpec::Suffix {
            text,
            fuzzy,
            case_sensitive: _,
        }
        | PatternSpec::Contains {
            text,
            fuzzy,
            case_sensitive: _,
        } => {
            validate_literal_text(text, *fuzzy, false, &mut errors);
        }
        PatternSpec::Regex {
            text,
            case_sensitive,
        } => {
            if text.is_empty() {
                errors.push(PatternError::EmptyPattern);
            }
            if let Err(e) = RegexBuilder::new(text)
                .case_insensitive(!case_sensitive)
                .build()
            {
                errors.push(PatternError::InvalidRegex(e.to_string()));
            }
        }
        PatternSpec::MultiSubstring {
            substrings,
            fuzzy,
            case_sensitive: _,
        } => {
            if substrings.is_empty() {
                errors.push(PatternError::EmptyPattern);
            }
            for s in substrings {
                validate_literal_text(s, *fuzzy, true, &mut errors);
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    build_pattern(spec)
}

fn validate_literal_text(
    text: &str,
    fuzzy: FuzzyMode,
    is_substring: bool,
    errors: &mut Vec<PatternError>,
) {
    if text.is_empty() {
        errors.push(if is_substring {
            PatternError::EmptySubstring
        } else {
            PatternError::EmptyPattern
        });
        return;
    }
    if text.chars().count() > MAX_SUBSTRING_LEN {
        errors.push(PatternError::SubstringTooLong);
    }
    if matches!(fuzzy, FuzzyMode::Phonetic) {
        errors.push(PatternError::UnsupportedFuzzyMode);
        return;
    }
    for ch in text.chars() {
        if !BASE64_ALPHABET.contains(ch) {
            errors.push(PatternError::InvalidCharacter(ch));
        }
    }
}

fn build_pattern(spec: PatternSpec) -> Result<Pattern, Vec<PatternError>> {
    let result = match spec {
        PatternSpec::Prefix {
            text,
            fuzzy,
            case_sensitive,
        } => {
            let folded = fold_case(&text, case_sensitive);
            let src = format!("^{}", build_source(fuzzy, &folded)?);
            let regex = compile_regex(&src)?;
            let meta = difficulty_meta_for(&[text.clone()], fuzzy, case_sensitive);
            Pattern {
                mode: PatternMode::Prefix { text },
                fuzzy,
                case_sensitive,
                compiled: CompiledMatcher::Prefix(Box::new(regex)),
                warnings: Vec::new(),
                difficulty_meta: meta,
            }
        }
        PatternSpec::Suffix {
            text,
            fuzzy,
            case_sensitive,
        } => {
            let folded = fold_case(&text, case_sensitive);
            let src = format!("{}$", build_source(fuzzy, &folded)?);
            let regex = compile_regex(&src)?;
            let meta = difficulty_meta_for(&[text.clone()], fuzzy, case_sensitive);
            Pattern {
                mode: PatternMode::Suffix { text },
                fuzzy,
                case_sensitive,
                compiled: CompiledMatcher::Suffix(Box::new(regex)),
                warnings: Vec::new(),
                difficulty_meta: meta,
            }
        }
        PatternSpec::Contains {
            text,
            fuzzy,
            case_sensitive,
        } => {
            let folded = fold_case(&text, case_sensitive);
            let src = build_source(fuzzy, &folded)?;
            let regex = compile_regex(&src)?;
            let meta = difficulty_meta_for(&[text.clone()], fuzzy, case_sensitive);
            Pattern {
                mode: PatternMode::Contains { text },
                fuzzy,
                case_sensitive,
                compiled: CompiledMatcher::Contains(Box::new(regex)),
                warnings: Vec::new(),
                difficulty_meta: meta,
            }
        }
        PatternSpec::Regex {
            text,
            case_sensitive,
        } => {
            let regex = RegexBuilder::new(&text)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| vec![PatternError::InvalidRegex(e.to_string())])?;
            Pattern {
                mode: PatternMode::Regex { text },
                fuzzy: FuzzyMode::None,
                case_sensitive,
                compiled: CompiledMatcher::Regex(Box::new(regex)),
                warnings: Vec::new(),
                difficulty_meta: DifficultyMeta {
                    total_matched_length: 0,
                    fuzzy_equivalence_product: 1.0,
                    case_foldable_alpha_count: 0,
                    substring_count: 0,
                },
            }
        }
        PatternSpec::MultiSubstring {
            substrings,
            fuzzy,
            case_sensitive,
        } => {
            let mut regexes = Vec::with_capacity(substrings.len());
            for s in &substrings {
                let folded = fold_case(s, case_sensitive);
                let src = build_source(fuzzy, &folded)?;
                regexes.push(compile_regex(&src)?);
            }
            let meta = difficulty_meta_for(&substrings, fuzzy, case_sensitive);
            Pattern {
                mode: PatternMode::MultiSubstring { substrings },
                fuzzy,
                case_sensitive,
                compiled: CompiledMatcher::MultiSubstring(regexes),
                warnings: Vec::new(),
                difficulty_meta: meta,
            }
        }
    };

    Ok(attach_warnings(result))
}

fn attach_warnings(mut pattern: Pattern) -> Pattern {
    let total = pattern.difficulty_meta.total_matched_length;
    if total >= INFEASIBLE_WARN_LEN {
        pattern.warnings.push(format!(
            "matched length {total} is likely infeasible to search at typical CPU rates"
        ));
    } else if total >= LONG_MATCH_WARN_LEN {
        pattern.warnings.push(format!(
            "matched length {total} is expected to take on the order of an hour or more"
        ));
    }
    pattern
}

fn fold_case(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

fn build_source(fuzzy: FuzzyMode, text: &str) -> Result<String, Vec<PatternError>> {
    let mut src = String::new();
    for ch in text.chars() {
        let eq = fuzzy::equivalents(fuzzy, ch).map_err(|e| vec![e])?;
        if eq.len() > 1 {
            src.push('[');
            for c in &eq {
                src.push(*c);
            }
            src.push(']');
        } else {
            src.push_str(&regex::escape(&ch.to_string()));
        }
    }
    Ok(src)
}

fn compile_regex(src: &str) -> Result<Regex, Vec<PatternError>> {
    Regex::new(src).map_err(|e| vec![PatternError::InvalidRegex(e.to_string())])
}

fn difficulty_meta_for(texts: &[String], fuzzy: FuzzyMode, case_sensitive: bool) -> DifficultyMeta {
    let mut total_matched_length = 0usize;
    let mut fuzzy_equivalence_product = 1.0f64;
    let mut case_foldable_alpha_count = 0usize;

    for text in texts {
        total_matched_length += text.chars().count();
        for ch in text.chars() {
            // equivalents() never errors here: Phonetic is rejected at
            // validation time, before difficulty_meta_for ever runs.
            let class_size = fuzzy::equivalents(fuzzy, ch).map(|v| v.len()).unwrap_or(1);
            fuzzy_equivalence_product *= class_size as f64;
            if !case_sensitive && ch.is_alphabetic() {
                case_foldable_alpha_count += 1;
            }
        }
    }

    DifficultyMeta {
        total_matched_length,
        fuzzy_equivalence_product,
        case_foldable_alpha_count,
        substring_count: texts.len(),
    }
}

/// Evaluate `pattern` against a full fingerprint string (including the
/// `SHA256:` prefix) and return the match positions, if any. Matching
/// itself is pinned to the 43-character searchable view (spec §9 open
/// question #4).
pub fn match_fingerprint(pattern: &Pattern, fingerprint: &str) -> Option<MatchRecord> {
    let view = crate::fingerprint::searchable_view(fingerprint);
    match &pattern.compiled {
        CompiledMatcher::Prefix(re) => match_single(re, view, pattern.case_sensitive),
        CompiledMatcher::Suffix(re) => match_single(re, view, pattern.case_sensitive),
        CompiledMatcher::Contains(re) => match_single(re, view, pattern.case_sensitive),
        CompiledMatcher::Regex(re) => {
            let m = re.find(view)?;
            Some(MatchRecord {
                positions: vec![MatchPosition {
                    index: 0,
                    start: m.start(),
                    end: m.end(),
                }],
            })
        }
        CompiledMatcher::MultiSubstring(regexes) => match_multi_substring(regexes, view, pattern.case_sensitive),
    }
}

fn match_single(re: &Regex, view: &str, case_sensitive: bool) -> Option<MatchRecord> {
    let folded = fold_case(view, case_sensitive);
    let m = re.find(&folded)?;
    Some(MatchRecord {
        positions: vec![MatchPosition {
            index: 0,
            start: m.start(),
            end: m.end(),
        }],
    })
}

fn match_multi_substring(regexes: &[Regex], view: &str, case_sensitive: bool) -> Option<MatchRecord> {
    let folded = fold_case(view, case_sensitive);
    let mut positions = Vec::with_capacity(regexes.len());
    let mut cursor = 0usize;
    for (i, re) in regexes.iter().enumerate() {
        let m = re.find_at(&folded, cursor)?;
        positions.push(MatchPosition {
            index: i,
            start: m.start(),
            end: m.end(),
        });
        cursor = m.end();
    }
    Some(MatchRecord { positions })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad_to_43(s: &str) -> String {
        let mut out = s.to_string();
        while out.chars().count() < 43 {
            out.push('x');
        }
        out.truncate(43);
        out
    }

    #[test]
    fn contains_match_basic() {
        let pattern = compile_pattern(PatternSpec::Contains {
            text: "boom".into(),
            fuzzy: FuzzyMode::None,
            case_sensitive: false,
        })
        .unwrap();
        let fp = format!("SHA256:{}", pad_to_43("xxBOOMxx"));
        let record = match_fingerprint(&pattern, &fp).unwrap();
        assert_eq!(record.positions[0].start, 2);
        assert_eq!(record.positions[0].end, 6);
    }

    #[test]
    fn prefix_and_suffix() {
        let prefix = compile_pattern(PatternSpec::Prefix {
            text: "ab".into(),
            fuzzy: FuzzyMode::None,
            case_sensitive: true,
        })
        .unwrap();
        let fp = format!("SHA256:{}", pad_to_43("abcdef"));
        assert!(match_fingerprint(&prefix, &fp).is_some());

        let not_prefix = format!("SHA256:{}", pad_to_43("xabcdef"));
        assert!(match_fingerprint(&prefix, &not_prefix).is_none());

        let suffix = compile_pattern(PatternSpec::Suffix {
            text: "yz".into(),
            fuzzy: FuzzyMode::None,
            case_sensitive: true,
        })
        .unwrap();
        let fp_end = format!("SHA256:{}", format!("{}{}", "a".repeat(41), "yz"));
        assert!(match_fingerprint(&suffix, &fp_end).is_some());
    }

    #[test]
    fn s3_multi_substring_leetspeak_positions() {
        let pattern = compile_pattern(PatternSpec::MultiSubstring {
            substrings: vec!["GO".into(), "BE".into(), "AWE".into(), "SOME".into()],
            fuzzy: FuzzyMode::Leetspeak,
            case_sensitive: false,
        })
        .unwrap();
        let body = pad_to_43("XGOYYBEZZAWEQQSOMEX");
        let fp = format!("SHA256:{body}");
        let record = match_fingerprint(&pattern, &fp).unwrap();
        let got: Vec<(usize, usize, usize)> = record
            .positions
            .iter()
            .map(|p| (p.index, p.start, p.end))
            .collect();
        assert_eq!(
            got,
            vec![(0, 1, 3), (1, 5, 7), (2, 9, 12), (3, 14, 18)]
        );
    }

    #[test]
    fn s4_leetspeak_matches_both_spellings() {
        let pattern = compile_pattern(PatternSpec::Contains {
            text: "B00M".into(),
            fuzzy: FuzzyMode::Leetspeak,
            case_sensitive: false,
        })
        .unwrap();

        let letters = format!("SHA256:{}", pad_to_43("xxBOOMxx"));
        let digits = format!("SHA256:{}", pad_to_43("xxB00Mxx"));
        assert!(match_fingerprint(&pattern, &letters).is_some());
        assert!(match_fingerprint(&pattern, &digits).is_some());

        assert_eq!(fuzzy::canonicalize_leetspeak("B00M"), "BOOM");
    }

    #[test]
    fn regex_mode_matches() {
        let pattern = compile_pattern(PatternSpec::Regex {
            text: "a{3}".into(),
            case_sensitive: false,
        })
        .unwrap();
        let fp = format!("SHA256:{}", pad_to_43("xxaaaxx"));
        assert!(match_fingerprint(&pattern, &fp).is_some());
    }

    #[test]
    fn regex_with_invalid_syntax_rejected() {
        let errs = compile_pattern(PatternSpec::Regex {
            text: "(".into(),
            case_sensitive: false,
        })
        .unwrap_err();
        assert!(matches!(errs[0], PatternError::InvalidRegex(_)));
    }

    #[test]
    fn empty_pattern_rejected() {
        let errs = compile_pattern(PatternSpec::Contains {
            text: "".into(),
            fuzzy: FuzzyMode::None,
            case_sensitive: false,
        })
        .unwrap_err();
        assert_eq!(errs, vec![PatternError::EmptyPattern]);
    }

    #[test]
    fn substring_too_long_rejected() {
        let errs = compile_pattern(PatternSpec::Contains {
            text: "a".repeat(21),
            fuzzy: FuzzyMode::None,
            case_sensitive: false,
        })
        .unwrap_err();
        assert_eq!(errs, vec![PatternError::SubstringTooLong]);
    }

    #[test]
    fn invalid_character_rejected() {
        let errs = compile_pattern(PatternSpec::Contains {
            text: "hi!".into(),
            fuzzy: FuzzyMode::None,
            case_sensitive: false,
        })
        .unwrap_err();
        assert_eq!(errs, vec![PatternError::InvalidCharacter('!')]);
    }

    #[test]
    fn phonetic_fuzzy_rejected_explicitly() {
        let errs = compile_pattern(PatternSpec::Contains {
            text: "hi".into(),
            fuzzy: FuzzyMode::Phonetic,
            case_sensitive: false,
        })
        .unwrap_err();
        assert_eq!(errs, vec![PatternError::UnsupportedFuzzyMode]);
    }

    #[test]
    fn long_match_warns() {
        let pattern = compile_pattern(PatternSpec::Contains {
            text: "abcdef".into(),
            fuzzy: FuzzyMode::None,
            case_sensitive: false,
        })
        .unwrap();
        assert!(!pattern.warnings().is_empty());
    }

    #[test]
    fn case_insensitive_matches_any_case() {
        let pattern = compile_pattern(PatternSpec::Contains {
            text: "Abc".into(),
            fuzzy: FuzzyMode::None,
            case_sensitive: false,
        })
        .unwrap();
        let fp = format!("SHA256:{}", pad_to_43("xxABCxx"));
        assert!(match_fingerprint(&pattern, &fp).is_some());
    }

    #[test]
    fn case_sensitive_rejects_wrong_case() {
        let pattern = compile_pattern(PatternSpec::Contains {
            text: "Abc".into(),
            fuzzy: FuzzyMode::None,
            case_sensitive: true,
        })
        .unwrap();
        let fp = format!("SHA256:{}", pad_to_43("xxABCxx"));
        assert!(match_fingerprint(&pattern, &fp).is_none());
    }
}
