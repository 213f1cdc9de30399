// src/dag/node.rs

//! Per-node state and the public [`Node`] handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::dag::graph::{lock_inner, GraphInner};
use crate::dag::types::{DependencyType, ResolutionStatus};
use crate::errors::Result;

/// Dynamic state of a single node, owned by the graph.
#[derive(Debug, Clone)]
pub(crate) struct NodeState<T> {
    pub(crate) item: T,
    pub(crate) deleted: bool,
    pub(crate) ready: bool,
    pub(crate) status: ResolutionStatus,
    /// Inbound edges still pending, keyed by source id.
    pub(crate) outstanding: HashMap<String, DependencyType>,
    /// Inbound edges whose effect has been decided, with the type effective
    /// at that moment.
    pub(crate) resolved: HashMap<String, DependencyType>,
}

impl<T> NodeState<T> {
    pub(crate) fn new(item: T) -> Self {
        Self {
            item,
            deleted: false,
            ready: false,
            status: ResolutionStatus::Waiting,
            outstanding: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// True while any outstanding entry gates readiness (And, Or or
    /// CompletionAnd). Optional and Obviated entries never do.
    pub(crate) fn has_blocking_dependency(&self) -> bool {
        self.outstanding.values().any(|ty| ty.blocks_readiness())
    }
}

/// Handle to a node in a [`crate::DirectedGraph`].
///
/// The handle is an id plus a reference back to the graph's interior; every
/// operation takes the graph mutex. Handles stay usable after
/// [`Node::remove`], but mutating calls then report
/// [`crate::GraphError::NodeDeleted`].
#[derive(Debug)]
pub struct Node<T> {
    graph: Arc<Mutex<GraphInner<T>>>,
    id: String,
}

impl<T> Node<T> {
    pub(crate) fn new(graph: Arc<Mutex<GraphInner<T>>>, id: String) -> Self {
        Self { graph, id }
    }

    fn lock(&self) -> MutexGuard<'_, GraphInner<T>> {
        lock_inner(&self.graph)
    }

    /// The node's unique id within its graph.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// A copy of the payload supplied at creation. The graph never inspects
    /// it.
    pub fn item(&self) -> T
    where
        T: Clone,
    {
        let inner = self.lock();
        inner
            .nodes
            .get(&self.id)
            .map(|state| state.item.clone())
            .expect("handles only exist for inserted ids and entries are never evicted")
    }

    /// Current resolution status. When racing against other threads, treat
    /// the value as a snapshot.
    pub fn resolution_status(&self) -> ResolutionStatus {
        let inner = self.lock();
        inner
            .nodes
            .get(&self.id)
            .map(|state| state.status)
            .unwrap_or(ResolutionStatus::Waiting)
    }

    /// Whether the node's dependency constraints are satisfied. Once true it
    /// stays true.
    pub fn is_ready(&self) -> bool {
        let inner = self.lock();
        inner
            .nodes
            .get(&self.id)
            .map(|state| state.ready)
            .unwrap_or(false)
    }

    /// Create an `And` edge from this node to `to_id`.
    ///
    /// Cycle-creating edges are not rejected here; `has_cycles` on the graph
    /// is the authoritative check.
    pub fn connect(&self, to_id: &str) -> Result<()> {
        self.lock().connect_nodes(&self.id, to_id, DependencyType::And)
    }

    /// Create a typed edge from `from_id` to this node: this node depends on
    /// `from_id` with the given semantics.
    pub fn connect_dependency(&self, from_id: &str, dependency_type: DependencyType) -> Result<()> {
        self.lock().connect_nodes(from_id, &self.id, dependency_type)
    }

    /// Remove the incoming edge from `from_id`.
    pub fn disconnect_inbound(&self, from_id: &str) -> Result<()> {
        self.lock().disconnect_edge(&self.id, from_id, &self.id)
    }

    /// Remove the outgoing edge to `to_id`.
    pub fn disconnect_outbound(&self, to_id: &str) -> Result<()> {
        self.lock().disconnect_edge(&self.id, &self.id, to_id)
    }

    /// Delete the node and every edge touching it.
    ///
    /// Removal does not propagate unresolvability: a dependent holding an
    /// `And` edge to a removed node simply sees the edge vanish and can wait
    /// forever. Remove nodes before calling `push_starting_nodes`, or accept
    /// that trade-off.
    pub fn remove(&self) -> Result<()> {
        self.lock().remove_node(&self.id)
    }

    /// All direct dependencies of this node, keyed by id.
    pub fn inbound_connections(&self) -> Result<HashMap<String, Node<T>>> {
        let inner = self.lock();
        inner.require_live(&self.id)?;
        Ok(inner
            .edges
            .inbound(&self.id)
            .map(|src| {
                (
                    src.to_string(),
                    Node::new(Arc::clone(&self.graph), src.to_string()),
                )
            })
            .collect())
    }

    /// All direct dependents of this node, keyed by id.
    pub fn outbound_connections(&self) -> Result<HashMap<String, Node<T>>> {
        let inner = self.lock();
        inner.require_live(&self.id)?;
        Ok(inner
            .edges
            .outbound(&self.id)
            .map(|dst| {
                (
                    dst.to_string(),
                    Node::new(Arc::clone(&self.graph), dst.to_string()),
                )
            })
            .collect())
    }

    /// Settle this node and notify its dependents.
    ///
    /// The transition out of `Waiting` happens at most once; a second call
    /// reports [`crate::GraphError::NodeResolutionAlreadySet`]. Passing
    /// `Waiting` is accepted and does not propagate, leaving the node
    /// resolvable later.
    pub fn resolve(&self, status: ResolutionStatus) -> Result<()> {
        self.lock().resolve_node(&self.id, status)
    }

    /// Snapshot of the dependencies still pending, with their current
    /// effective types.
    pub fn outstanding_dependencies(&self) -> HashMap<String, DependencyType> {
        let inner = self.lock();
        inner
            .nodes
            .get(&self.id)
            .map(|state| state.outstanding.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the dependencies whose effect has been decided, with the
    /// type that was effective at that moment.
    pub fn resolved_dependencies(&self) -> HashMap<String, DependencyType> {
        let inner = self.lock();
        inner
            .nodes
            .get(&self.id)
            .map(|state| state.resolved.clone())
            .unwrap_or_default()
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            id: self.id.clone(),
        }
    }
}
