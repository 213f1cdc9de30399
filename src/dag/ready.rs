// src/dag/ready.rs

//! The set of nodes that have become ready since the last drain.

use std::collections::HashSet;

/// Nodes accumulate here when their dependency constraints are satisfied and
/// leave in one batch when the caller drains the queue. Membership is a set:
/// a node queued twice before a drain is still handed out once.
#[derive(Debug, Default)]
pub(crate) struct ReadyQueue {
    queued: HashSet<String>,
}

impl ReadyQueue {
    pub(crate) fn insert(&mut self, id: &str) {
        self.queued.insert(id.to_string());
    }

    /// Non-destructive check used by `has_ready_nodes`.
    pub(crate) fn has_any(&self) -> bool {
        !self.queued.is_empty()
    }

    /// Hand out everything queued so far and start over empty.
    pub(crate) fn drain(&mut self) -> HashSet<String> {
        std::mem::take(&mut self.queued)
    }
}
