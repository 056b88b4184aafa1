//! Position hash functions.
//!
//! A [`PositionHasher`] maps bytes to a point on the `u64` ring. The ring
//! relies on it being deterministic and stable across process runs, so every
//! implementation here is either unkeyed ([`Blake3Hasher`]) or keyed with an
//! explicit, caller-supplied seed ([`SipHasher`]).

use std::hash::Hasher;

use orbit_types::HasherKind;
use siphasher::sip::SipHasher13;

/// Maps arbitrary bytes to a position on the ring.
pub trait PositionHasher: Send + Sync {
    /// Compute the ring position for `bytes`.
    fn position(&self, bytes: &[u8]) -> u64;
}

/// BLAKE3 truncated to its first 8 bytes, read as little-endian `u64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl PositionHasher for Blake3Hasher {
    fn position(&self, bytes: &[u8]) -> u64 {
        let hash = blake3::hash(bytes);
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }
}

/// SipHash-1-3 with a fixed 128-bit key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SipHasher {
    key0: u64,
    key1: u64,
}

impl SipHasher {
    /// Create a hasher keyed with `(key0, key1)`.
    pub fn new(key0: u64, key1: u64) -> Self {
        Self { key0, key1 }
    }
}

impl PositionHasher for SipHasher {
    fn position(&self, bytes: &[u8]) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(self.key0, self.key1);
        hasher.write(bytes);
        hasher.finish()
    }
}

/// A hasher chosen at runtime from a [`HasherKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyHasher {
    /// See [`Blake3Hasher`].
    Blake3(Blake3Hasher),
    /// See [`SipHasher`].
    Sip(SipHasher),
}

impl Default for AnyHasher {
    fn default() -> Self {
        Self::Blake3(Blake3Hasher)
    }
}

impl From<HasherKind> for AnyHasher {
    fn from(kind: HasherKind) -> Self {
        match kind {
            HasherKind::Blake3 => Self::Blake3(Blake3Hasher),
            HasherKind::Siphash { key0, key1 } => Self::Sip(SipHasher::new(key0, key1)),
        }
    }
}

impl PositionHasher for AnyHasher {
    fn position(&self, bytes: &[u8]) -> u64 {
        match self {
            Self::Blake3(h) => h.position(bytes),
            Self::Sip(h) => h.position(bytes),
        }
    }
}
