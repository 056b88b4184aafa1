//! Error types for ring operations.

/// Errors produced by the ring.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// The ring was configured with a virtual node count it cannot use.
    #[error("invalid configuration: virtual node count must be positive, got {virtual_nodes}")]
    InvalidConfiguration {
        /// The rejected virtual node count.
        virtual_nodes: usize,
    },

    /// A key was resolved against a ring with no nodes.
    #[error("ring is empty: no nodes available")]
    EmptyRing,
}
