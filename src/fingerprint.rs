//! SSH fingerprint engine.
//!
//! Serializes an Ed25519 public key in the SSH wire format (RFC 4253
//! §6.6) and computes its SHA-256 fingerprint, exactly as `ssh-keygen -l`
//! would report it for an `ssh-ed25519` key.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use md5::Md5;
use sha2::{Digest, Sha256};

const ALGO_NAME: &[u8] = b"ssh-ed25519";
const FINGERPRINT_PREFIX: &str = "SHA256:";

/// Body length of a SHA-256 fingerprint: base64(32-byte digest), no padding.
pub const FINGERPRINT_BODY_LEN: usize = 43;

/// Full fingerprint length, including the `SHA256:` prefix.
pub const FINGERPRINT_LEN: usize = FINGERPRINT_PREFIX.len() + FINGERPRINT_BODY_LEN;

/// Encode an Ed25519 public key as an SSH wire-format byte string:
/// `len("ssh-ed25519") || "ssh-ed25519" || len(key) || key`.
pub fn ssh_wire_bytes(public_key: &[u8; 32]) -> Vec<u8> {
    let mut wire = Vec::with_capacity(4 + ALGO_NAME.len() + 4 + 32);
    wire.extend_from_slice(&(ALGO_NAME.len() as u32).to_be_bytes());
    wire.extend_from_slice(ALGO_NAME);
    wire.extend_from_slice(&(public_key.len() as u32).to_be_bytes());
    wire.extend_from_slice(public_key);
    wire
}

/// Compute the `SHA256:<43 chars>` fingerprint of an Ed25519 public key.
pub fn ssh_fingerprint(public_key: &[u8; 32]) -> String {
    let wire = ssh_wire_bytes(public_key);
    let digest = Sha256::digest(&wire);
    let body = STANDARD_NO_PAD.encode(digest);
    debug_assert_eq!(body.len(), FINGERPRINT_BODY_LEN);
    format!("{FINGERPRINT_PREFIX}{body}")
}

/// Extract the 43-character searchable body from a full fingerprint
/// string (stripping the `SHA256:` prefix once, centrally — no other
/// code path should re-derive this).
pub fn searchable_view(fingerprint: &str) -> &str {
    fingerprint
        .strip_prefix(FINGERPRINT_PREFIX)
        .unwrap_or(fingerprint)
}

/// Render an `authorized_keys`-style line. Not part of any proof.
pub fn authorized_keys_line(public_key: &[u8; 32], comment: Option<&str>) -> String {
    let wire = ssh_wire_bytes(public_key);
    let encoded = STANDARD.encode(wire);
    match comment {
        Some(c) => format!("ssh-ed25519 {encoded} {c}"),
        None => format!("ssh-ed25519 {encoded}"),
    }
}

/// Legacy MD5 fingerprint, colon-separated hex pairs, for human display
/// only. Never part of a proof.
pub fn md5_fingerprint(public_key: &[u8; 32]) -> String {
    let wire = ssh_wire_bytes(public_key);
    let digest = Md5::digest(&wire);
    digest
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Normalize a fingerprint string for comparison (trim whitespace only;
/// constant-time comparison is not required since fingerprints are
/// public values).
pub fn normalize(fingerprint: &str) -> &str {
    fingerprint.trim()
}
