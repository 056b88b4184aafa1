//! Shared types for Orbit.
//!
//! This crate defines the identifiers and configuration types shared by the
//! ring and its callers: the node identifier ([`NodeId`]) and ring
//! configuration ([`RingConfig`], [`HasherKind`]).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID types
// ---------------------------------------------------------------------------

/// Opaque identifier for a physical server on the ring.
///
/// Carries no structure beyond identity: two nodes are the same node exactly
/// when their identifiers compare equal.
#[derive(Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Selection of the function used to place keys and virtual nodes on the ring.
///
/// Every variant is seeded explicitly so positions are stable across process
/// runs and builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HasherKind {
    /// BLAKE3, truncated to the first 8 bytes.
    #[default]
    Blake3,
    /// SipHash-1-3 keyed with a fixed 128-bit key.
    Siphash {
        /// First half of the SipHash key.
        #[serde(default)]
        key0: u64,
        /// Second half of the SipHash key.
        #[serde(default)]
        key1: u64,
    },
}

impl fmt::Display for HasherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => f.write_str("blake3"),
            Self::Siphash { key0, key1 } => write!(f, "siphash({key0:#x}, {key1:#x})"),
        }
    }
}

/// Parameters for building a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Number of virtual nodes placed on the ring for each physical node.
    pub virtual_nodes: usize,
    /// Position hash function.
    pub hasher: HasherKind,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            virtual_nodes: 3,
            hasher: HasherKind::Blake3,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
