//! Integration test: concurrent access to a shared ring.
//!
//! Readers run on tokio worker threads while writers add and remove nodes.

use std::collections::HashSet;
use std::sync::Arc;

use orbit_integration_tests::{TestCluster, keys, node};
use orbit_ring::Ring;
use orbit_types::NodeId;

/// Concurrent joins from many tasks all land; none is lost.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30000)]
async fn test_concurrent_joins_no_lost_updates() {
    let c = TestCluster::new(0, 32);

    let mut handles = Vec::new();
    for i in 0..20 {
        let ring = c.ring().clone();
        handles.push(tokio::spawn(async move {
            ring.add_node(node(i));
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(c.ring().node_count(), 20);

    // Same state as adding sequentially (no collisions expected at this size).
    let mut sequential = Ring::new(32).unwrap();
    for i in 0..20 {
        sequential.add_node(node(i));
    }
    let shared = c.ring().snapshot();
    assert!(shared.entries().eq(sequential.entries()));
}

/// Readers never fail and only ever see nodes that were on the ring.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30000)]
async fn test_readers_during_churn() {
    let c = TestCluster::new(3, 64);
    let keys = Arc::new(keys(500));
    let churn: Vec<NodeId> = (100..105).map(node).collect();
    let mut known: HashSet<NodeId> = c.members().iter().cloned().collect();
    known.extend(churn.iter().cloned());
    let known = Arc::new(known);

    let writer = {
        let ring = c.ring().clone();
        tokio::spawn(async move {
            for round in 0..40 {
                let id = &churn[round % churn.len()];
                ring.add_node(id.clone());
                tokio::task::yield_now().await;
                ring.remove_node(id);
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..8 {
        let ring = c.ring().clone();
        let keys = Arc::clone(&keys);
        let known = Arc::clone(&known);
        readers.push(tokio::spawn(async move {
            for key in keys.iter() {
                let owner = ring.resolve(key).expect("stable members never leave");
                assert!(known.contains(&owner), "unknown owner {owner}");
                let replicas = ring.resolve_n(key, 2);
                assert_eq!(replicas.len(), 2);
                assert_ne!(replicas[0], replicas[1]);
            }
        }));
    }

    writer.await.unwrap();
    for r in readers {
        r.await.unwrap();
    }

    // Every churn node left again.
    assert_eq!(c.ring().node_count(), 3);
}

/// A snapshot taken mid-churn is always a whole ring state.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30000)]
async fn test_snapshots_are_consistent() {
    let c = TestCluster::new(2, 16);

    let writer = {
        let ring = c.ring().clone();
        tokio::spawn(async move {
            for i in 10..60 {
                ring.add_node(node(i));
            }
        })
    };

    let observer = {
        let ring = c.ring().clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let snap = ring.snapshot();
                // Each present node owns all of its vnodes: no half-applied add.
                assert_eq!(snap.vnode_count(), snap.node_count() * 16);
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    observer.await.unwrap();
    assert_eq!(c.ring().node_count(), 52);
}
