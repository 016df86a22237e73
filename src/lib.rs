//! Deterministic HD derivation, SSH fingerprinting, pattern matching,
//! difficulty estimation, and order proofs for a zero-knowledge vanity
//! SSH key search protocol.
//!
//! A customer holds a seed; a search worker holds only the resulting
//! root public key and searches child indices for one whose SSH
//! fingerprint satisfies a pattern, without ever touching a private
//! key. This crate implements the five pieces that make that possible:
//! [`derivation`], [`fingerprint`], [`pattern`], [`difficulty`], and
//! [`proof`]. CLI, HTTP transport, storage, job queues, and the actual
//! search loop are out of scope — see `src/bin/vanikeys-demo.rs` for a
//! thin illustration of how a caller wires these pieces together.

pub mod derivation;
pub mod difficulty;
pub mod error;
pub mod fingerprint;
pub mod pattern;
pub mod proof;
