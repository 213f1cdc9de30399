// tests/concurrency.rs

//! The graph is one mutex; these tests exercise the surface from multiple
//! threads and check that the single-resolution and hand-out-once guarantees
//! hold under contention.

use std::collections::HashSet;
use std::thread;

use flowdag::{DependencyType, DirectedGraph, GraphError, Node, ResolutionStatus};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn graph_and_handles_are_send_and_sync() {
    assert_send_sync::<DirectedGraph<String>>();
    assert_send_sync::<Node<String>>();
}

#[test]
fn concurrent_resolution_has_one_winner() {
    let graph = DirectedGraph::new();
    graph.add_node("contended", 0u32).unwrap();
    graph.push_starting_nodes();

    let results: Vec<Result<(), GraphError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    graph
                        .node_by_id("contended")
                        .unwrap()
                        .resolve(ResolutionStatus::Resolved)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results {
        if let Err(err) = result {
            assert!(matches!(err, GraphError::NodeResolutionAlreadySet { .. }));
        }
    }
}

#[test]
fn parallel_fan_in_reaches_the_dependent() {
    let graph = DirectedGraph::new();
    let sink = graph.add_node("sink", ()).unwrap();
    for i in 0..16 {
        let id = format!("src-{i}");
        graph.add_node(id.clone(), ()).unwrap();
        sink.connect_dependency(&id, DependencyType::And).unwrap();
    }
    graph.push_starting_nodes();
    let seeded = graph.pop_ready_nodes();
    assert_eq!(seeded.len(), 16);

    thread::scope(|scope| {
        for id in seeded.keys() {
            let id = id.clone();
            let graph = &graph;
            scope.spawn(move || {
                graph
                    .node_by_id(&id)
                    .unwrap()
                    .resolve(ResolutionStatus::Resolved)
                    .unwrap();
            });
        }
    });

    let ready: HashSet<String> = graph.pop_ready_nodes().into_keys().collect();
    assert_eq!(ready, HashSet::from(["sink".to_string()]));
    assert!(graph.node_by_id("sink").unwrap().is_ready());
}

#[test]
fn concurrent_pops_hand_each_node_out_once() {
    let graph = DirectedGraph::new();
    for i in 0..32 {
        graph.add_node(format!("n-{i}"), ()).unwrap();
    }
    graph.push_starting_nodes();

    let batches: Vec<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| graph.pop_ready_nodes().into_keys().collect::<Vec<_>>()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::new();
    for batch in batches {
        for id in batch {
            assert!(seen.insert(id), "node handed out twice");
        }
    }
    assert_eq!(seen.len(), 32);
    assert!(!graph.has_ready_nodes());
}
