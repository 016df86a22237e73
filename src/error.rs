//! Error taxonomy for the vanikeys core.
//!
//! Each component owns a closed `Error` enum rather than a single
//! catch-all type, so callers can match on exactly the failure kinds
//! their component can produce. No `anyhow`: this is a library, and
//! its contract is that identical inputs produce identical typed
//! errors (see spec §7).

use core::fmt;

/// Errors from the derivation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationError {
    /// A seed was not exactly 32 bytes.
    InvalidSeed,
    /// An index fell outside `[0, 2^32)`. Unreachable for a plain `u32`
    /// argument; kept for API symmetry with the spec's error taxonomy
    /// and for callers that parse indices from untrusted strings.
    InvalidIndex,
}

impl fmt::Display for DerivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSeed => write!(f, "seed must be exactly 32 bytes"),
            Self::InvalidIndex => write!(f, "index must be in [0, 2^32)"),
        }
    }
}

impl std::error::Error for DerivationError {}

/// Errors from master-seed generation.
#[derive(Debug)]
pub enum SeedGenerationError {
    /// The OS RNG failed to produce randomness.
    RngFailure(rand::Error),
}

impl fmt::Display for SeedGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RngFailure(e) => write!(f, "seed generation failed: {e}"),
        }
    }
}

impl std::error::Error for SeedGenerationError {}

/// Errors from the pattern engine, raised at `compile_pattern` time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Pattern text (or a substring) was empty.
    EmptyPattern,
    /// One substring in a multi-substring pattern was empty.
    EmptySubstring,
    /// A substring exceeded the 20-character limit.
    SubstringTooLong,
    /// A character fell outside the base64 alphabet in a non-regex pattern.
    InvalidCharacter(char),
    /// The regex failed to compile.
    InvalidRegex(String),
    /// A fuzzy mode was requested that isn't implemented.
    UnsupportedFuzzyMode,
    /// Fuzzy matching was requested together with regex mode, which the
    /// spec does not define a combined semantics for.
    IncompatibleFuzzyMode,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPattern => write!(f, "pattern text must not be empty"),
            Self::EmptySubstring => write!(f, "substring must not be empty"),
            Self::SubstringTooLong => write!(f, "substring exceeds 20 characters"),
            Self::InvalidCharacter(c) => write!(f, "character '{c}' is outside the base64 alphabet"),
            Self::InvalidRegex(msg) => write!(f, "invalid regex: {msg}"),
            Self::UnsupportedFuzzyMode => write!(f, "fuzzy mode is not implemented"),
            Self::IncompatibleFuzzyMode => write!(f, "fuzzy matching is not defined for regex mode"),
        }
    }
}

impl std::error::Error for PatternError {}

/// Errors from the proof engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The pattern was not satisfied by the fingerprint at the given index.
    NoMatch,
    /// Re-derived root public key did not match the proof's root public key.
    RootMismatch,
    /// Re-derived child public key did not match the proof's child public key.
    DerivationMismatch,
    /// Recomputed fingerprint did not match the proof's fingerprint.
    FingerprintMismatch,
    /// Re-evaluating the pattern against the fingerprint did not reproduce
    /// the proof's recorded match positions.
    PatternMismatch,
    /// Recomputed derivation hash did not match the proof's derivation hash.
    TamperedProof,
    /// Serialized proof bytes could not be parsed.
    Serialization(String),
    /// The pattern itself failed to compile.
    Pattern(PatternError),
}

impl fmt::Display for ProofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "pattern was not satisfied at the given index"),
            Self::RootMismatch => write!(f, "root public key mismatch"),
            Self::DerivationMismatch => write!(f, "derived child public key mismatch"),
            Self::FingerprintMismatch => write!(f, "fingerprint mismatch"),
            Self::PatternMismatch => write!(f, "pattern match positions mismatch"),
            Self::TamperedProof => write!(f, "derivation hash does not match proof contents"),
            Self::Serialization(msg) => write!(f, "proof serialization error: {msg}"),
            Self::Pattern(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ProofError {}

impl From<PatternError> for ProofError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}
