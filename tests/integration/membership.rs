//! Integration test: membership changes.
//!
//! Add and remove nodes on a shared ring and verify that only the keys of
//! the changed node move.

use orbit_integration_tests::{TestCluster, assignments, keys, moved, node};
use orbit_ring::{Ring, RingError};
use orbit_types::NodeId;

/// Three servers with 3 vnodes each; removing Server2 only remaps its keys.
#[test]
fn test_three_server_walkthrough() {
    let mut ring = Ring::new(3).unwrap();
    for s in ["Server1", "Server2", "Server3"] {
        ring.add_node(NodeId::from(s));
    }

    let keys: Vec<String> = (1..=5).map(|i| format!("Key{i}")).collect();
    let before = assignments(&ring, &keys);
    // Resolution is stable for an unchanged ring.
    assert_eq!(before, assignments(&ring, &keys));

    let server2 = NodeId::from("Server2");
    ring.remove_node(&server2);
    let after = assignments(&ring, &keys);

    for (old, new) in before.iter().zip(&after) {
        assert_ne!(*new, server2);
        if *old != server2 {
            assert_eq!(old, new);
        }
    }
}

/// Every key resolves to a current member after any sequence of changes.
#[test]
fn test_coverage_through_churn() {
    let mut c = TestCluster::new(4, 64);
    let keys = keys(2_000);

    let n5 = c.join();
    c.leave(&node(1));
    c.join();
    c.leave(&n5);

    for owner in c.assignments(&keys) {
        assert!(c.members().contains(&owner), "{owner} is not a member");
    }
}

/// Removing one node out of ten only moves keys that node owned.
#[test]
fn test_leave_moves_only_departed_keys() {
    let mut c = TestCluster::new(10, 128);
    let keys = keys(20_000);
    let before = c.assignments(&keys);

    let departed = node(7);
    c.leave(&departed);
    let after = c.assignments(&keys);

    let moved = moved(&before, &after);
    assert!(!moved.is_empty());
    for i in &moved {
        assert_eq!(before[*i], departed, "key {i} moved off a surviving node");
    }
    let owned = before.iter().filter(|n| **n == departed).count();
    assert_eq!(moved.len(), owned);
}

/// A joining node only takes keys, never shuffles them between old members.
#[test]
fn test_join_moves_roughly_one_nth() {
    let mut c = TestCluster::new(9, 128);
    let keys = keys(20_000);
    let before = c.assignments(&keys);

    let joined = c.join();
    let after = c.assignments(&keys);

    let moved = moved(&before, &after);
    for i in &moved {
        assert_eq!(after[*i], joined);
    }
    // Expect ~1/10 of keys; allow wide slack for vnode variance.
    let ratio = moved.len() as f64 / keys.len() as f64;
    assert!((0.03..=0.25).contains(&ratio), "moved ratio {ratio:.3}");
}

/// Leaving and rejoining restores the original assignment exactly.
#[test]
fn test_leave_then_rejoin_restores_assignments() {
    let c = TestCluster::new(5, 64);
    let keys = keys(5_000);
    let before = c.assignments(&keys);

    c.ring().remove_node(&node(2));
    c.ring().add_node(node(2));

    assert_eq!(before, c.assignments(&keys));
}

/// Removing every node empties the ring and lookups fail cleanly.
#[test]
fn test_drain_to_empty() {
    let mut c = TestCluster::new(3, 16);
    for id in c.members().to_vec() {
        c.leave(&id);
    }

    assert_eq!(c.ring().node_count(), 0);
    assert!(c.ring().snapshot().is_empty());
    assert_eq!(c.ring().resolve("user:000001"), Err(RingError::EmptyRing));
}

/// Arc ownership tracks the share of keys each node receives.
#[test]
fn test_ownership_predicts_key_share() {
    let c = TestCluster::new(4, 256);
    let ring = c.ring().snapshot();
    let keys = keys(40_000);
    let owners = assignments(&ring, &keys);

    for (id, share) in ring.ownership() {
        let observed = owners.iter().filter(|o| **o == id).count() as f64 / keys.len() as f64;
        assert!(
            (observed - share).abs() < 0.03,
            "{id}: arc share {share:.3}, key share {observed:.3}"
        );
    }
}
