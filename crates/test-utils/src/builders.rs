#![allow(dead_code)]

use flowdag::{DependencyType, DirectedGraph};

/// Builder for small test graphs. Node payloads are the node ids; edges are
/// declared as (node, depends-on, type) triples and applied in order.
pub struct GraphBuilder {
    nodes: Vec<String>,
    deps: Vec<(String, String, DependencyType)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            deps: Vec::new(),
        }
    }

    pub fn node(mut self, id: &str) -> Self {
        self.nodes.push(id.to_string());
        self
    }

    /// `node` depends on `depends_on` with the given type.
    pub fn dep(mut self, node: &str, depends_on: &str, ty: DependencyType) -> Self {
        self.deps
            .push((node.to_string(), depends_on.to_string(), ty));
        self
    }

    pub fn and(self, node: &str, depends_on: &str) -> Self {
        self.dep(node, depends_on, DependencyType::And)
    }

    pub fn or(self, node: &str, depends_on: &str) -> Self {
        self.dep(node, depends_on, DependencyType::Or)
    }

    pub fn optional(self, node: &str, depends_on: &str) -> Self {
        self.dep(node, depends_on, DependencyType::Optional)
    }

    pub fn completion(self, node: &str, depends_on: &str) -> Self {
        self.dep(node, depends_on, DependencyType::CompletionAnd)
    }

    pub fn build(self) -> DirectedGraph<String> {
        let graph = DirectedGraph::new();
        for id in &self.nodes {
            graph
                .add_node(id.clone(), id.clone())
                .expect("builder node ids must be unique");
        }
        for (node, depends_on, ty) in &self.deps {
            graph
                .node_by_id(node)
                .expect("builder edge references a declared node")
                .connect_dependency(depends_on, *ty)
                .expect("builder edges must be valid");
        }
        graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
