// src/dag/resolve.rs

//! The resolution engine: seeding, dependency settlement, readiness and
//! unresolvable propagation.
//!
//! Every method here runs with the graph mutex already held; the public
//! entry points in [`super::graph`] and [`super::node`] take the lock once
//! and recursion stays inside it.

use tracing::debug;

use crate::dag::graph::GraphInner;
use crate::dag::node::NodeState;
use crate::dag::types::{DependencyType, ResolutionStatus};
use crate::errors::{GraphError, Result};

/// Move every non-gating outstanding entry (Optional or Obviated) into the
/// resolved map as Obviated. Runs at the transition into readiness: an
/// Optional that has not resolved by then can no longer be credited.
fn demote_nonblocking<T>(state: &mut NodeState<T>) {
    let demoted: Vec<String> = state
        .outstanding
        .iter()
        .filter(|(_, ty)| !ty.blocks_readiness())
        .map(|(dep, _)| dep.clone())
        .collect();
    for dep in demoted {
        state.outstanding.remove(&dep);
        state.resolved.insert(dep, DependencyType::Obviated);
    }
}

impl<T> GraphInner<T> {
    /// Queue every node whose outstanding dependencies do not gate readiness.
    ///
    /// This is the one path that may queue an already-ready node: a cloned
    /// graph starts with an empty queue, and re-seeding is how processing
    /// resumes there.
    pub(crate) fn push_starting_nodes(&mut self) {
        let seeds: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, state)| !state.deleted && !state.has_blocking_dependency())
            .map(|(id, _)| id.clone())
            .collect();
        debug!(count = seeds.len(), "seeding starting nodes");
        for id in seeds {
            if let Some(state) = self.nodes.get_mut(&id) {
                demote_nonblocking(state);
                state.ready = true;
            }
            self.ready.insert(&id);
        }
    }

    /// Settle `id` with the given status and notify its dependents.
    ///
    /// A `Waiting` status is accepted without propagation. Terminal statuses
    /// propagate depth-first along outbound edges; the graph is acyclic, so
    /// the recursion terminates.
    pub(crate) fn resolve_node(&mut self, id: &str, status: ResolutionStatus) -> Result<()> {
        {
            let state = self
                .nodes
                .get_mut(id)
                .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })?;
            if state.deleted {
                return Err(GraphError::NodeDeleted { id: id.to_string() });
            }
            if state.status != ResolutionStatus::Waiting {
                return Err(GraphError::NodeResolutionAlreadySet {
                    id: id.to_string(),
                    existing: state.status,
                    requested: status,
                });
            }
            state.status = status;
        }
        if status == ResolutionStatus::Waiting {
            return Ok(());
        }
        debug!(node = %id, status = %status, "node settled; notifying dependents");
        let dependents: Vec<String> = self.edges.outbound(id).map(str::to_string).collect();
        for dependent in dependents {
            self.dependency_settled(&dependent, id, status)?;
        }
        Ok(())
    }

    /// Apply the effect of `dep_id` settling with `outcome` on its dependent
    /// `id`.
    fn dependency_settled(
        &mut self,
        id: &str,
        dep_id: &str,
        outcome: ResolutionStatus,
    ) -> Result<()> {
        if outcome == ResolutionStatus::Waiting {
            return Err(GraphError::NotifiedOfWaiting {
                id: id.to_string(),
                dependency: dep_id.to_string(),
            });
        }
        let dep_type = {
            let Some(state) = self.nodes.get(id) else {
                return Err(GraphError::NodeNotFound { id: id.to_string() });
            };
            if state.deleted {
                return Err(GraphError::NodeDeleted { id: id.to_string() });
            }
            match state.outstanding.get(dep_id).copied() {
                Some(ty) => ty,
                None => {
                    // Obviated peers and optionals closed out at the ready
                    // transition still notify once their source finishes;
                    // their effect has already been decided.
                    if state.resolved.contains_key(dep_id) {
                        return Ok(());
                    }
                    return Err(if self.edges.contains(dep_id, id) {
                        GraphError::DuplicateDependencyResolution {
                            id: id.to_string(),
                            dependency: dep_id.to_string(),
                        }
                    } else {
                        GraphError::ConnectionDoesNotExist {
                            from: dep_id.to_string(),
                            to: id.to_string(),
                        }
                    });
                }
            }
        };

        match (dep_type, outcome) {
            (DependencyType::Obviated, _) => {
                self.settle_entry(id, dep_id, DependencyType::Obviated);
            }
            (DependencyType::Optional, ResolutionStatus::Resolved) => {
                // Credited, but optionals never gate readiness.
                self.settle_entry(id, dep_id, DependencyType::Optional);
            }
            (DependencyType::Optional, _) => {
                // An unresolvable optional leaves no trace.
                self.drop_entry(id, dep_id);
            }
            (DependencyType::CompletionAnd, _) => {
                // Completion counts in either direction; the outcome itself
                // does not propagate.
                self.settle_entry(id, dep_id, DependencyType::CompletionAnd);
                self.check_ready(id);
            }
            (DependencyType::And, ResolutionStatus::Resolved) => {
                self.settle_entry(id, dep_id, DependencyType::And);
                self.check_ready(id);
            }
            (DependencyType::And, _) => {
                self.settle_entry(id, dep_id, DependencyType::And);
                self.propagate_unresolvable(id)?;
            }
            (DependencyType::Or, ResolutionStatus::Resolved) => {
                // First success wins: the peers no longer contribute.
                self.settle_entry(id, dep_id, DependencyType::Or);
                self.obviate_remaining_ors(id);
                self.check_ready(id);
            }
            (DependencyType::Or, _) => {
                let has_alternative = self.nodes.get(id).is_some_and(|state| {
                    state
                        .outstanding
                        .iter()
                        .any(|(dep, ty)| dep.as_str() != dep_id && *ty == DependencyType::Or)
                });
                if has_alternative {
                    debug!(
                        node = %id,
                        dependency = %dep_id,
                        "alternative dependency unresolvable; another remains"
                    );
                    self.drop_entry(id, dep_id);
                } else {
                    self.settle_entry(id, dep_id, DependencyType::Or);
                    self.propagate_unresolvable(id)?;
                }
            }
        }
        Ok(())
    }

    /// Move `dep_id` from outstanding to resolved under the given type.
    fn settle_entry(&mut self, id: &str, dep_id: &str, dependency_type: DependencyType) {
        if let Some(state) = self.nodes.get_mut(id) {
            state.outstanding.remove(dep_id);
            state.resolved.insert(dep_id.to_string(), dependency_type);
        }
    }

    /// Remove `dep_id` from outstanding without recording it.
    fn drop_entry(&mut self, id: &str, dep_id: &str) {
        if let Some(state) = self.nodes.get_mut(id) {
            state.outstanding.remove(dep_id);
        }
    }

    /// Demote every still-outstanding Or entry to Obviated.
    fn obviate_remaining_ors(&mut self, id: &str) {
        if let Some(state) = self.nodes.get_mut(id) {
            for ty in state.outstanding.values_mut() {
                if *ty == DependencyType::Or {
                    *ty = DependencyType::Obviated;
                }
            }
        }
    }

    /// Queue `id` if it just became eligible: readiness transitions exactly
    /// once, when no outstanding entry gates it any more.
    fn check_ready(&mut self, id: &str) {
        let Some(state) = self.nodes.get_mut(id) else {
            return;
        };
        if state.ready || state.has_blocking_dependency() {
            return;
        }
        demote_nonblocking(state);
        state.ready = true;
        self.ready.insert(id);
        debug!(node = %id, "dependencies satisfied; node ready");
    }

    /// A required dependency failed: mark `id` ready, queue it and settle it
    /// as unresolvable, which recurses into its own dependents. Skipped
    /// entirely when `id` is already terminal.
    fn propagate_unresolvable(&mut self, id: &str) -> Result<()> {
        {
            let Some(state) = self.nodes.get_mut(id) else {
                return Ok(());
            };
            if state.status != ResolutionStatus::Waiting {
                return Ok(());
            }
            demote_nonblocking(state);
            if !state.ready {
                state.ready = true;
                self.ready.insert(id);
            }
        }
        debug!(node = %id, "required dependency unresolvable; marking node unresolvable");
        self.resolve_node(id, ResolutionStatus::Unresolvable)
    }
}
