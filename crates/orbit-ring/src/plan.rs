//! Key movement between two ring states.

use orbit_types::NodeId;

use crate::hasher::PositionHasher;
use crate::ring::Ring;

/// A key whose owner changes between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration<K> {
    /// The key that must move.
    pub key: K,
    /// The node that owns it in the old ring.
    pub from: NodeId,
    /// The node that owns it in the new ring.
    pub to: NodeId,
}

impl<H: PositionHasher> Ring<H> {
    /// Compute which keys change owner between two ring states.
    ///
    /// A key produces a migration when both rings resolve it and disagree on
    /// the owner. Keys that cannot be resolved on one side (an empty ring)
    /// have nowhere to move from or to and are skipped.
    pub fn diff<K: AsRef<[u8]> + Clone>(
        old: &Ring<H>,
        new: &Ring<H>,
        keys: &[K],
    ) -> Vec<Migration<K>> {
        keys.iter()
            .filter_map(|key| {
                let from = old.resolve(key).ok()?;
                let to = new.resolve(key).ok()?;
                (from != to).then(|| Migration {
                    key: key.clone(),
                    from: from.clone(),
                    to: to.clone(),
                })
            })
            .collect()
    }
}
