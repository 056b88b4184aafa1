//! Thread-safe handle around a [`Ring`].

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use orbit_types::NodeId;

use crate::error::RingError;
use crate::hasher::{Blake3Hasher, PositionHasher};
use crate::ring::Ring;

/// A [`Ring`] shared between threads behind a `RwLock`.
///
/// Lookups take the read lock and may run in parallel. Membership changes
/// take the write lock, so every lookup observes the ring either entirely
/// before or entirely after a given add or remove. Cloning the handle shares
/// the same ring.
#[derive(Debug)]
pub struct SharedRing<H = Blake3Hasher> {
    inner: Arc<RwLock<Ring<H>>>,
}

impl<H> Clone for SharedRing<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> From<Ring<H>> for SharedRing<H> {
    fn from(ring: Ring<H>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }
}

impl<H: PositionHasher> SharedRing<H> {
    /// Wrap an existing ring.
    pub fn new(ring: Ring<H>) -> Self {
        Self::from(ring)
    }

    /// Add a node. See [`Ring::add_node`].
    pub fn add_node(&self, node_id: NodeId) {
        self.write().add_node(node_id);
    }

    /// Remove a node. See [`Ring::remove_node`].
    pub fn remove_node(&self, node_id: &NodeId) {
        self.write().remove_node(node_id);
    }

    /// Find the node that owns `key`. See [`Ring::resolve`].
    pub fn resolve<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<NodeId, RingError> {
        self.read().resolve(key).cloned()
    }

    /// Collect up to `n` distinct nodes for `key`. See [`Ring::resolve_n`].
    pub fn resolve_n<K: AsRef<[u8]> + ?Sized>(&self, key: &K, n: usize) -> Vec<NodeId> {
        self.read().resolve_n(key, n)
    }
}

impl<H> SharedRing<H> {
    /// Return the number of physical nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.read().node_count()
    }

    /// Return whether `node_id` is on the ring.
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.read().contains(node_id)
    }

    fn read(&self) -> RwLockReadGuard<'_, Ring<H>> {
        self.inner.read().expect("lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ring<H>> {
        self.inner.write().expect("lock poisoned")
    }
}

impl<H: Clone> SharedRing<H> {
    /// Copy the current ring state.
    pub fn snapshot(&self) -> Ring<H> {
        self.read().clone()
    }
}
