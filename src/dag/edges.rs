// src/dag/edges.rs

//! Adjacency storage: forward (source → destinations) and reverse
//! (destination → sources) sets, always updated in lockstep.
//!
//! No edge metadata lives here; a dependency's type is held in the
//! destination node's outstanding/resolved maps.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeStore {
    forward: HashMap<String, HashSet<String>>,
    reverse: HashMap<String, HashSet<String>>,
}

impl EdgeStore {
    /// Register empty adjacency sets for a newly added node.
    pub(crate) fn add_slot(&mut self, id: &str) {
        self.forward.entry(id.to_string()).or_default();
        self.reverse.entry(id.to_string()).or_default();
    }

    pub(crate) fn contains(&self, from: &str, to: &str) -> bool {
        self.forward.get(from).is_some_and(|dsts| dsts.contains(to))
    }

    pub(crate) fn insert(&mut self, from: &str, to: &str) {
        self.forward
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        self.reverse
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
    }

    pub(crate) fn remove(&mut self, from: &str, to: &str) {
        if let Some(dsts) = self.forward.get_mut(from) {
            dsts.remove(to);
        }
        if let Some(srcs) = self.reverse.get_mut(to) {
            srcs.remove(from);
        }
    }

    /// Drop every edge touching `id`, plus the node's own adjacency slots.
    pub(crate) fn remove_node(&mut self, id: &str) {
        if let Some(dsts) = self.forward.remove(id) {
            for dst in dsts {
                if let Some(srcs) = self.reverse.get_mut(&dst) {
                    srcs.remove(id);
                }
            }
        }
        if let Some(srcs) = self.reverse.remove(id) {
            for src in srcs {
                if let Some(dsts) = self.forward.get_mut(&src) {
                    dsts.remove(id);
                }
            }
        }
    }

    pub(crate) fn outbound<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.forward
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub(crate) fn inbound<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.reverse
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub(crate) fn has_inbound(&self, id: &str) -> bool {
        self.reverse.get(id).is_some_and(|srcs| !srcs.is_empty())
    }

    /// All edges as (source, destination) pairs, in storage order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward
            .iter()
            .flat_map(|(from, dsts)| dsts.iter().map(move |to| (from.as_str(), to.as_str())))
    }
}
