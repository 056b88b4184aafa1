//! Consistent hashing ring implementation.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use orbit_types::{NodeId, RingConfig};
use tracing::{debug, warn};

use crate::error::RingError;
use crate::hasher::{AnyHasher, Blake3Hasher, PositionHasher};

/// Separator between a node ID and its vnode index when computing positions.
pub const VNODE_SEPARATOR: char = '#';

/// Size of the position space, `2^64`.
const RING_SPAN: u128 = 1 << 64;

/// Consistent hashing ring mapping keys to nodes.
///
/// Each node is mapped to `virtual_nodes` virtual nodes (vnodes) on a u64
/// ring. A key belongs to the first vnode found walking clockwise from the
/// key's own position, wrapping past `u64::MAX` back to the smallest position.
///
/// Two vnodes landing on the same position are resolved last-write-wins: the
/// node added later owns the position.
#[derive(Debug, Clone)]
pub struct Ring<H = Blake3Hasher> {
    /// Virtual node positions: ring position -> physical node.
    vnodes: BTreeMap<u64, NodeId>,
    /// Nodes added and not since removed.
    nodes: BTreeSet<NodeId>,
    /// Number of vnodes placed per node.
    virtual_nodes: usize,
    hasher: H,
}

impl Ring<Blake3Hasher> {
    /// Create a new empty ring hashed with BLAKE3.
    ///
    /// Fails with [`RingError::InvalidConfiguration`] if `virtual_nodes` is 0.
    pub fn new(virtual_nodes: usize) -> Result<Self, RingError> {
        Self::with_hasher(virtual_nodes, Blake3Hasher)
    }
}

impl Ring<AnyHasher> {
    /// Create a new empty ring from configuration.
    pub fn from_config(config: &RingConfig) -> Result<Self, RingError> {
        Self::with_hasher(config.virtual_nodes, AnyHasher::from(config.hasher))
    }
}

impl<H: PositionHasher> Ring<H> {
    /// Create a new empty ring that places keys and vnodes with `hasher`.
    pub fn with_hasher(virtual_nodes: usize, hasher: H) -> Result<Self, RingError> {
        if virtual_nodes == 0 {
            return Err(RingError::InvalidConfiguration { virtual_nodes });
        }
        Ok(Self {
            vnodes: BTreeMap::new(),
            nodes: BTreeSet::new(),
            virtual_nodes,
            hasher,
        })
    }

    /// Add a node to the ring.
    ///
    /// Places `virtual_nodes` vnodes at `hash(node_id ++ "#" ++ i)`. Any vnode
    /// already at one of those positions is overwritten. Re-adding a node that
    /// is already present rewrites identical entries and changes nothing.
    pub fn add_node(&mut self, node_id: NodeId) {
        for i in 0..self.virtual_nodes {
            let pos = self.vnode_position(&node_id, i);
            if let Some(prev) = self.vnodes.insert(pos, node_id.clone()) {
                if prev != node_id {
                    warn!(
                        position = pos,
                        %prev,
                        node = %node_id,
                        "vnode collision, position reassigned"
                    );
                }
            }
        }

        self.nodes.insert(node_id.clone());
        debug!(%node_id, vnodes = self.virtual_nodes, "added node to ring");
    }

    /// Remove a node from the ring.
    ///
    /// Only positions still owned by `node_id` are deleted; a position taken
    /// over by another node through a collision keeps its new owner. Removing
    /// a node that is not on the ring does nothing.
    pub fn remove_node(&mut self, node_id: &NodeId) {
        let mut removed = 0usize;
        for i in 0..self.virtual_nodes {
            let pos = self.vnode_position(node_id, i);
            if let Entry::Occupied(entry) = self.vnodes.entry(pos) {
                if entry.get() == node_id {
                    entry.remove();
                    removed += 1;
                }
            }
        }

        if self.nodes.remove(node_id) {
            debug!(%node_id, removed, "removed node from ring");
        }
    }

    /// Find the node that owns `key`.
    ///
    /// Returns the owner of the smallest vnode position `>=` the key's
    /// position, or of the smallest position overall when the key lies past
    /// the last vnode. Fails with [`RingError::EmptyRing`] if the ring has no
    /// vnodes.
    pub fn resolve<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<&NodeId, RingError> {
        let pos = self.position_of(key);
        self.vnodes
            .range(pos..)
            .next()
            .or_else(|| self.vnodes.iter().next())
            .map(|(_, node_id)| node_id)
            .ok_or(RingError::EmptyRing)
    }

    /// Collect up to `n` distinct nodes for `key`, in clockwise order.
    ///
    /// The first element is always the node [`Ring::resolve`] returns. If
    /// fewer than `n` nodes still own a position, returns every node that
    /// does. A node whose every vnode was taken over is never returned.
    pub fn resolve_n<K: AsRef<[u8]> + ?Sized>(&self, key: &K, n: usize) -> Vec<NodeId> {
        if self.vnodes.is_empty() || n == 0 {
            return Vec::new();
        }

        let pos = self.position_of(key);
        let max_distinct = n.min(self.nodes.len());
        let mut owners: Vec<NodeId> = Vec::with_capacity(max_distinct);

        // BTreeMap::range gives us everything >= pos, then we wrap around.
        let after = self.vnodes.range(pos..);
        let before = self.vnodes.range(..pos);

        for (_, node_id) in after.chain(before) {
            if !owners.contains(node_id) {
                owners.push(node_id.clone());
                if owners.len() == max_distinct {
                    break;
                }
            }
        }

        owners
    }

    /// Return the ring position `key` hashes to.
    pub fn position_of<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> u64 {
        self.hasher.position(key.as_ref())
    }

    /// Return the fraction of the ring owned by each node.
    ///
    /// The arc `(previous position, position]` belongs to the owner of
    /// `position`; the smallest position also owns the arc that wraps past
    /// `u64::MAX`. Nodes whose every vnode was taken over report `0.0`.
    pub fn ownership(&self) -> BTreeMap<NodeId, f64> {
        let mut shares: BTreeMap<NodeId, u128> =
            self.nodes.iter().map(|n| (n.clone(), 0)).collect();

        if let Some((&last, _)) = self.vnodes.iter().next_back() {
            let mut prev = last;
            for (&pos, node_id) in &self.vnodes {
                let arc = if self.vnodes.len() == 1 {
                    RING_SPAN
                } else {
                    (pos as u128 + RING_SPAN - prev as u128) % RING_SPAN
                };
                *shares.entry(node_id.clone()).or_default() += arc;
                prev = pos;
            }
        }

        shares
            .into_iter()
            .map(|(node_id, arc)| (node_id, arc as f64 / RING_SPAN as f64))
            .collect()
    }

    fn vnode_position(&self, node_id: &NodeId, index: usize) -> u64 {
        let label = format!("{node_id}{VNODE_SEPARATOR}{index}");
        self.hasher.position(label.as_bytes())
    }
}

impl<H> Ring<H> {
    /// Return whether `node_id` is on the ring.
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.nodes.contains(node_id)
    }

    /// Return the number of physical nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the total number of vnodes in the ring.
    pub fn vnode_count(&self) -> usize {
        self.vnodes.len()
    }

    /// Return the number of vnodes placed per node.
    pub fn virtual_nodes(&self) -> usize {
        self.virtual_nodes
    }

    /// Return whether the ring has no vnodes.
    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// Return all node IDs in the ring, sorted.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().cloned().collect()
    }

    /// Iterate over `(position, node)` entries in ascending position order.
    pub fn entries(&self) -> impl Iterator<Item = (u64, &NodeId)> + '_ {
        self.vnodes.iter().map(|(&pos, node_id)| (pos, node_id))
    }
}
