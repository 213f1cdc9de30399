// src/dag/graph.rs

//! [`DirectedGraph`]: node storage and structural operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::edges::EdgeStore;
use crate::dag::mermaid;
use crate::dag::node::{Node, NodeState};
use crate::dag::ready::ReadyQueue;
use crate::dag::types::{DependencyType, ResolutionStatus};
use crate::errors::{GraphError, Result};

/// A directed acyclic graph of work items with typed dependencies.
///
/// All state lives behind one mutex; every public operation on the graph or
/// on a [`Node`] handle locks it for the duration of the call, so the graph
/// can be shared freely across threads. Concurrency of the work items
/// themselves is the caller's concern.
#[derive(Debug)]
pub struct DirectedGraph<T> {
    inner: Arc<Mutex<GraphInner<T>>>,
}

impl<T> Default for DirectedGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The mutex-guarded interior: node states, adjacency and the ready queue.
#[derive(Debug)]
pub(crate) struct GraphInner<T> {
    pub(crate) nodes: HashMap<String, NodeState<T>>,
    pub(crate) edges: EdgeStore,
    pub(crate) ready: ReadyQueue,
}

impl<T> Default for GraphInner<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: EdgeStore::default(),
            ready: ReadyQueue::default(),
        }
    }
}

/// Lock the interior, absorbing poisoning: every operation validates the
/// state it touches on entry, so a panicked holder does not brick the graph.
pub(crate) fn lock_inner<T>(inner: &Mutex<GraphInner<T>>) -> MutexGuard<'_, GraphInner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> DirectedGraph<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(GraphInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GraphInner<T>> {
        lock_inner(&self.inner)
    }

    fn handle(&self, id: &str) -> Node<T> {
        Node::new(Arc::clone(&self.inner), id.to_string())
    }

    /// Insert a node with the given id and payload.
    ///
    /// Ids are unique for the lifetime of the graph: re-adding an id, even
    /// one whose node has been removed, reports `NodeAlreadyExists`.
    pub fn add_node(&self, id: impl Into<String>, item: T) -> Result<Node<T>> {
        let id = id.into();
        {
            let mut inner = self.lock();
            if inner.nodes.contains_key(&id) {
                return Err(GraphError::NodeAlreadyExists { id });
            }
            inner.nodes.insert(id.clone(), NodeState::new(item));
            inner.edges.add_slot(&id);
        }
        Ok(self.handle(&id))
    }

    /// Look up a live node by id.
    pub fn node_by_id(&self, id: &str) -> Result<Node<T>> {
        {
            let inner = self.lock();
            match inner.nodes.get(id) {
                Some(state) if !state.deleted => {}
                _ => {
                    return Err(GraphError::NodeNotFound { id: id.to_string() });
                }
            }
        }
        Ok(self.handle(id))
    }

    /// All live nodes, keyed by id.
    pub fn nodes(&self) -> HashMap<String, Node<T>> {
        let inner = self.lock();
        inner
            .nodes
            .iter()
            .filter(|(_, state)| !state.deleted)
            .map(|(id, _)| (id.clone(), self.handle(id)))
            .collect()
    }

    /// Live nodes with no inbound edges. Structural only: independent of
    /// resolution state, useful as the seed set for a topological walk.
    pub fn nodes_without_inbound(&self) -> HashMap<String, Node<T>> {
        let inner = self.lock();
        inner
            .nodes
            .iter()
            .filter(|(id, state)| !state.deleted && !inner.edges.has_inbound(id))
            .map(|(id, _)| (id.clone(), self.handle(id)))
            .collect()
    }

    /// Whether the current edge set contains a cycle.
    ///
    /// Edge insertion does not reject cycle-creating edges; this query is the
    /// authoritative check and is expected to be run after construction.
    pub fn has_cycles(&self) -> bool {
        let inner = self.lock();
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (id, state) in inner.nodes.iter() {
            if !state.deleted {
                graph.add_node(id.as_str());
            }
        }
        for (from, to) in inner.edges.iter() {
            graph.add_edge(from, to, ());
        }
        // A topological sort fails exactly when there is a cycle.
        toposort(&graph, None).is_err()
    }

    /// Seed the ready queue with every node whose outstanding dependencies do
    /// not gate readiness. Intended to be called once after construction,
    /// before any resolution; on a cloned graph it re-queues the nodes that
    /// were already ready so processing can resume.
    pub fn push_starting_nodes(&self) {
        self.lock().push_starting_nodes();
    }

    /// Whether any node became ready since the last drain.
    pub fn has_ready_nodes(&self) -> bool {
        self.lock().ready.has_any()
    }

    /// Drain the ready queue, returning each queued node with its status at
    /// pop time. The status is a hint: another thread may settle a node
    /// between the queue entry and the pop, so consult the node directly when
    /// it matters.
    pub fn pop_ready_nodes(&self) -> HashMap<String, ResolutionStatus> {
        let mut inner = self.lock();
        let drained = inner.ready.drain();
        drained
            .into_iter()
            .filter_map(|id| inner.nodes.get(&id).map(|state| (id, state.status)))
            .collect()
    }

    /// Render the edge set as a Mermaid flowchart, with failure-handling
    /// edges routed into a separate sub-section.
    pub fn mermaid(&self) -> String {
        mermaid::render(&self.lock())
    }
}

/// Deep copy: an independent graph with the same nodes, edges and per-node
/// dynamic state, and an empty ready queue. Resuming the clone is a
/// `push_starting_nodes` call away.
impl<T: Clone> Clone for DirectedGraph<T> {
    fn clone(&self) -> Self {
        let inner = self.lock();
        Self {
            inner: Arc::new(Mutex::new(GraphInner {
                nodes: inner.nodes.clone(),
                edges: inner.edges.clone(),
                ready: ReadyQueue::default(),
            })),
        }
    }
}

impl<T> GraphInner<T> {
    /// Absent and removed ids both fail here; removal is permanent.
    pub(crate) fn require_live(&self, id: &str) -> Result<()> {
        match self.nodes.get(id) {
            None => Err(GraphError::NodeNotFound { id: id.to_string() }),
            Some(state) if state.deleted => Err(GraphError::NodeDeleted { id: id.to_string() }),
            Some(_) => Ok(()),
        }
    }

    /// Validate and insert the edge `from → to`, recording the dependency
    /// type on the destination.
    pub(crate) fn connect_nodes(
        &mut self,
        from: &str,
        to: &str,
        dependency_type: DependencyType,
    ) -> Result<()> {
        self.require_live(from)?;
        self.require_live(to)?;
        if from == to {
            return Err(GraphError::CannotConnectToSelf {
                id: from.to_string(),
            });
        }
        if self.edges.contains(from, to) {
            return Err(GraphError::ConnectionAlreadyExists {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.edges.insert(from, to);
        if let Some(state) = self.nodes.get_mut(to) {
            state.outstanding.insert(from.to_string(), dependency_type);
        }
        Ok(())
    }

    /// Remove the edge `from → to`. `caller` is the handle the request came
    /// through and determines which end is reported as deleted.
    pub(crate) fn disconnect_edge(&mut self, caller: &str, from: &str, to: &str) -> Result<()> {
        self.require_live(caller)?;
        let other = if caller == from { to } else { from };
        if self.nodes.get(other).is_none_or(|state| state.deleted) {
            return Err(GraphError::NodeNotFound {
                id: other.to_string(),
            });
        }
        if !self.edges.contains(from, to) {
            return Err(GraphError::ConnectionDoesNotExist {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.edges.remove(from, to);
        // The edge's dependency entry lives on the destination, under
        // whichever map it has reached.
        if let Some(state) = self.nodes.get_mut(to) {
            state.outstanding.remove(from);
            state.resolved.remove(from);
        }
        Ok(())
    }

    /// Delete all incident edges and tombstone the node. The id stays taken;
    /// retained handles keep answering with `NodeDeleted`.
    pub(crate) fn remove_node(&mut self, id: &str) -> Result<()> {
        self.require_live(id)?;
        let dependents: Vec<String> = self.edges.outbound(id).map(str::to_string).collect();
        for dependent in dependents {
            if let Some(state) = self.nodes.get_mut(&dependent) {
                state.outstanding.remove(id);
                state.resolved.remove(id);
            }
        }
        self.edges.remove_node(id);
        if let Some(state) = self.nodes.get_mut(id) {
            state.deleted = true;
            state.outstanding.clear();
            state.resolved.clear();
        }
        Ok(())
    }
}
