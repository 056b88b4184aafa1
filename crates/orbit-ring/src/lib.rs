//! Consistent hashing ring for deterministic key placement.
//!
//! This crate implements a consistent hash ring that maps arbitrary keys to
//! node IDs. Adding or removing a node only remaps the keys that node owned
//! (roughly `1/N` of the key space) instead of reshuffling everything.
//!
//! The ring uses virtual nodes (vnodes): each physical node gets multiple
//! positions on the ring, determined by `hash(node_id ++ "#" ++ vnode_index)`.
//! More vnodes per node = more uniform distribution.
//!
//! The position hash is injected through [`PositionHasher`] so placement is
//! stable across process runs. [`SharedRing`] wraps a [`Ring`] for use from
//! many threads, and [`Ring::diff`] plans which keys move between two ring
//! states.

mod error;
pub mod hasher;
mod plan;
mod ring;
mod shared;

pub use error::RingError;
pub use hasher::{AnyHasher, Blake3Hasher, PositionHasher, SipHasher};
pub use plan::Migration;
pub use ring::{Ring, VNODE_SEPARATOR};
pub use shared::SharedRing;
