//! Proof engine.
//!
//! Composes the derivation, fingerprint, and pattern engines into an
//! order proof: a self-contained commitment that a server can emit
//! after a successful search, and that a customer can verify against
//! their own seed (full verification) or, informationally, against
//! their own stored root public key alone (passwordless verification).
//!
//! Neither verification path is a signature scheme — spec §4.5 is
//! explicit that the derivation hash is a commitment, not a signature;
//! the only thing binding a proof to a customer is the one-wayness of
//! HD derivation itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::derivation::{self, Seed, PROTOCOL_TAG};
use crate::error::ProofError;
use crate::fingerprint;
use crate::pattern::{self, Pattern, PatternRecord};

/// A completed order proof, produced by `generate_order_proof` and
/// checked by the two `verify_*` functions. Field order is fixed so
/// that serialization is stable (spec §6's wire encoding): the
/// derivation proof's fields (`index`, `root_pub`, `child_pub`,
/// `derivation_hash`) are inlined here rather than nested, matching the
/// flat field list spec §6 gives for `OrderProof`'s wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProof {
    pub protocol_tag: String,
    pub index: u32,
    #[serde(with = "hex_32")]
    pub root_pub: [u8; 32],
    #[serde(with = "hex_32")]
    pub child_pub: [u8; 32],
    #[serde(with = "hex_32")]
    pub derivation_hash: [u8; 32],
    pub fingerprint: String,
    /// Full pattern description (mode, text/substrings, fuzzy,
    /// case_sensitive) so a holder of only this proof can independently
    /// re-evaluate the match without consulting the original caller.
    pub pattern: PatternRecord,
    pub match_positions: Vec<pattern::MatchPosition>,
}

/// The result of verifying an [`OrderProof`]. Every sub-check is
/// reported, never short-circuited, so the caller can present a full
/// diagnostic (spec §7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub root_matches: bool,
    pub derivation_matches: bool,
    pub hash_matches: bool,
    pub fingerprint_matches: bool,
    pub pattern_matches: bool,
    /// `true` only for the full (seed-holding) verification path; the
    /// passwordless path never proves this and always reports `false`
    /// here, per spec §4.5 ("MUST NOT gate private-key derivation").
    pub derivation_proven: bool,
    pub valid: bool,
}

fn derivation_hash(root_pub: &[u8; 32], index: u32, child_pub: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(PROTOCOL_TAG);
    hasher.update(root_pub);
    hasher.update(index.to_be_bytes());
    hasher.update(child_pub);
    hasher.finalize().into()
}

/// Derive the child at `index` from `seed`, confirm `pattern` matches
/// its fingerprint, and emit the order proof justifying that match.
pub fn generate_order_proof(
    seed: &Seed,
    index: u32,
    pattern: &Pattern,
) -> Result<OrderProof, ProofError> {
    let root = derivation::seed_to_root_keypair(seed);
    let child = derivation::derive_child_keypair(seed, index);
    let fp = fingerprint::ssh_fingerprint(&child.public_bytes);

    let record = pattern::match_fingerprint(pattern, &fp).ok_or(ProofError::NoMatch)?;

    let hash = derivation_hash(&root.public_bytes, index, &child.public_bytes);

    Ok(OrderProof {
        protocol_tag: String::from_utf8_lossy(PROTOCOL_TAG).into_owned(),
        index,
        root_pub: root.public_bytes,
        child_pub: child.public_bytes,
        derivation_hash: hash,
        fingerprint: fp,
        pattern: pattern.to_record(),
        match_positions: record.positions,
    })
}

/// Full verification: re-derive everything from `seed` and confirm it
/// reproduces every field of `proof`. This is the only path that
/// should ever gate deriving and using the private key.
pub fn verify_order_proof(
    proof: &OrderProof,
    seed: &Seed,
    pattern: &Pattern,
) -> VerificationReport {
    let root = derivation::seed_to_root_keypair(seed);
    let root_matches = root.public_bytes == proof.root_pub;

    let child = derivation::derive_child_keypair(seed, proof.index);
    let derivation_matches = child.public_bytes == proof.child_pub;

    let hash = derivation_hash(&proof.root_pub, proof.index, &proof.child_pub);
    let hash_matches = hash == proof.derivation_hash;

    let recomputed_fp = fingerprint::ssh_fingerprint(&child.public_bytes);
    let fingerprint_matches = recomputed_fp == proof.fingerprint;

    let pattern_matches = match pattern::match_fingerprint(pattern, &recomputed_fp) {
        Some(record) => record.positions == proof.match_positions,
        None => false,
    };

    let valid = root_matches
        && derivation_matches
        && hash_matches
        && fingerprint_matches
        && pattern_matches;

    VerificationReport {
        root_matches,
        derivation_matches,
        hash_matches,
        fingerprint_matches,
        pattern_matches,
        derivation_proven: valid,
        valid,
    }
}

/// Passwordless verification: check that `proof` is internally
/// consistent and pattern-satisfying, and that it claims the
/// customer's own stored root public key — but without the seed there
/// is no way to confirm `child_pub` was actually derived from it. This
/// path is informational only (spec §4.5); it MUST NOT gate private
/// key derivation.
pub fn verify_order_proof_passwordless(
    proof: &OrderProof,
    stored_root_pub: &[u8; 32],
    pattern: &Pattern,
) -> VerificationReport {
    let root_matches = &proof.root_pub == stored_root_pub;

    let pattern_matches = match pattern::match_fingerprint(pattern, &proof.fingerprint) {
        Some(record) => record.positions == proof.match_positions,
        None => false,
    };

    let fingerprint_matches = fingerprint::normalize(&proof.fingerprint) == proof.fingerprint;
    let hash_matches = proof.derivation_hash != [0u8; 32];

    let valid = root_matches && pattern_matches && fingerprint_matches && hash_matches;

    VerificationReport {
        root_matches,
        // Never claimed by this path: a dishonest server could submit
        // any fingerprint satisfying the pattern.
        derivation_matches: false,
        hash_matches,
        fingerprint_matches,
        pattern_matches,
        derivation_proven: false,
        valid,
    }
}

/// Serialize a proof to its stable wire form (field order fixed by
/// `OrderProof`'s derive).
pub fn proof_to_bytes(proof: &OrderProof) -> Result<Vec<u8>, ProofError> {
    serde_json::to_vec(proof).map_err(|e| ProofError::Serialization(e.to_string()))
}

/// Parse a proof from its wire form.
pub fn proof_from_bytes(bytes: &[u8]) -> Result<OrderProof, ProofError> {
    serde_json::from_slice(bytes).map_err(|e| ProofError::Serialization(e.to_string()))
}

mod hex_32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}
