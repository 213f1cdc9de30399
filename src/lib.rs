// src/lib.rs

//! Dependency-resolution DAG: the scheduling core of a workflow engine.
//!
//! Clients build a [`DirectedGraph`] of work items, connect them with typed
//! dependencies ([`DependencyType`]), seed the ready queue with
//! [`DirectedGraph::push_starting_nodes`], and then drive resolution: every
//! [`Node::resolve`] call settles that node's dependents, which may make them
//! ready (retrievable via [`DirectedGraph::pop_ready_nodes`]) or mark them
//! unresolvable along required edges.
//!
//! The surface is synchronous and thread-safe behind a single mutex per
//! graph; running the work items themselves is the caller's concern.

pub mod dag;
pub mod errors;

pub use dag::{DependencyType, DirectedGraph, Node, ResolutionStatus};
pub use errors::{GraphError, Result};
