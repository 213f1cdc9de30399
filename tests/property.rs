// tests/property.rs

//! Property tests over random layered DAGs.
//!
//! Acyclicity comes from the construction: node `i` may only depend on nodes
//! with a smaller index, so any generated dependency list forms a DAG.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use flowdag::{DependencyType, DirectedGraph, ResolutionStatus};

fn dependency_type() -> impl Strategy<Value = DependencyType> {
    prop_oneof![
        Just(DependencyType::And),
        Just(DependencyType::Or),
        Just(DependencyType::CompletionAnd),
        Just(DependencyType::Optional),
    ]
}

fn raw_dag(max_nodes: usize) -> impl Strategy<Value = Vec<Vec<(usize, DependencyType)>>> {
    (2..=max_nodes).prop_flat_map(|num_nodes| {
        proptest::collection::vec(
            proptest::collection::vec((any::<usize>(), dependency_type()), 0..4),
            num_nodes,
        )
    })
}

fn node_id(i: usize) -> String {
    format!("task_{i}")
}

/// Build a graph from raw per-node dependency lists, sanitising indices so
/// node `i` only depends on nodes `< i` and each ordered pair appears once.
fn build_graph(raw: &[Vec<(usize, DependencyType)>]) -> DirectedGraph<usize> {
    let graph = DirectedGraph::new();
    for i in 0..raw.len() {
        graph.add_node(node_id(i), i).expect("ids are unique");
    }
    for (i, deps) in raw.iter().enumerate() {
        if i == 0 {
            continue;
        }
        let node = graph.node_by_id(&node_id(i)).expect("node was added");
        let mut seen = HashSet::new();
        for (raw_dep, ty) in deps {
            let dep = raw_dep % i;
            if seen.insert(dep) {
                node.connect_dependency(&node_id(dep), *ty)
                    .expect("sanitised edges are valid");
            }
        }
    }
    graph
}

/// Per-node invariants that must hold after every public operation.
fn check_invariants(graph: &DirectedGraph<usize>) -> Result<(), TestCaseError> {
    for (id, node) in graph.nodes() {
        let outstanding = node.outstanding_dependencies();
        let resolved = node.resolved_dependencies();
        for dep in resolved.keys() {
            prop_assert!(
                !outstanding.contains_key(dep),
                "dependency {} of {} is in both maps",
                dep,
                id
            );
        }
        if node.resolution_status() == ResolutionStatus::Unresolvable {
            prop_assert!(node.is_ready(), "unresolvable node {} must be ready", id);
        } else if node.is_ready() {
            prop_assert!(
                !outstanding.values().any(|ty| matches!(
                    ty,
                    DependencyType::And | DependencyType::Or | DependencyType::CompletionAnd
                )),
                "ready node {} still has a gating dependency",
                id
            );
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn resolving_everything_drains_the_graph(raw in raw_dag(12)) {
        let graph = build_graph(&raw);
        prop_assert!(!graph.has_cycles());
        graph.push_starting_nodes();

        let mut seen: HashSet<String> = HashSet::new();
        let mut rounds = 0;
        while graph.has_ready_nodes() {
            rounds += 1;
            prop_assert!(rounds <= raw.len(), "resolution did not converge");
            for (id, _) in graph.pop_ready_nodes() {
                prop_assert!(seen.insert(id.clone()), "node {} handed out twice", id);
                let node = graph.node_by_id(&id).unwrap();
                if node.resolution_status() == ResolutionStatus::Waiting {
                    node.resolve(ResolutionStatus::Resolved).unwrap();
                }
            }
            check_invariants(&graph)?;
        }

        prop_assert_eq!(seen.len(), raw.len());
        for (id, node) in graph.nodes() {
            prop_assert!(node.is_ready(), "node {} never became ready", id);
        }
    }

    #[test]
    fn failures_propagate_without_breaking_invariants(
        raw in raw_dag(12),
        failing in proptest::collection::hash_set(0..12usize, 0..6),
    ) {
        let graph = build_graph(&raw);
        graph.push_starting_nodes();

        let mut seen: HashSet<String> = HashSet::new();
        let mut terminal: HashMap<String, ResolutionStatus> = HashMap::new();
        let mut rounds = 0;
        while graph.has_ready_nodes() {
            rounds += 1;
            prop_assert!(rounds <= raw.len(), "resolution did not converge");
            for (id, _) in graph.pop_ready_nodes() {
                prop_assert!(seen.insert(id.clone()), "node {} handed out twice", id);
                let node = graph.node_by_id(&id).unwrap();
                // Propagation may have settled the node between the queue
                // entry and this pop; only still-waiting nodes get resolved.
                if node.resolution_status() == ResolutionStatus::Waiting {
                    let index: usize = id.trim_start_matches("task_").parse().unwrap();
                    let outcome = if failing.contains(&index) {
                        ResolutionStatus::Unresolvable
                    } else {
                        ResolutionStatus::Resolved
                    };
                    node.resolve(outcome).unwrap();
                }
            }

            // Terminal statuses never change.
            for (id, status) in &terminal {
                prop_assert_eq!(graph.node_by_id(id).unwrap().resolution_status(), *status);
            }
            for (id, node) in graph.nodes() {
                let status = node.resolution_status();
                if status.is_terminal() {
                    terminal.insert(id, status);
                }
            }
            check_invariants(&graph)?;
        }

        // Whatever failed, every node settles: handed out exactly once and
        // ready at the end.
        prop_assert_eq!(seen.len(), raw.len());
        for (id, node) in graph.nodes() {
            prop_assert!(node.is_ready(), "node {} never became ready", id);
        }
    }
}
