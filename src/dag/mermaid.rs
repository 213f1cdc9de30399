// src/dag/mermaid.rs

//! Mermaid flowchart rendering of the edge set.

use std::sync::LazyLock;

use regex::Regex;

use crate::dag::graph::GraphInner;

/// Destinations that represent failure handling get routed into the error
/// sub-section of the chart.
static ERROR_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(?:error|crashed|failed|deploy_failed)$").expect("pattern is a valid literal")
});

/// Render the edge set as a line-oriented Mermaid flowchart. Edges are sorted
/// by (source, destination) so the output is deterministic.
pub(crate) fn render<T>(inner: &GraphInner<T>) -> String {
    let mut edges: Vec<(&str, &str)> = inner.edges.iter().collect();
    edges.sort_unstable();

    let mut lines = vec![
        "%% Mermaid markdown workflow".to_string(),
        "flowchart LR".to_string(),
        "%% Success path".to_string(),
    ];
    let mut error_path = vec!["%% Error path".to_string()];

    for (from, to) in edges {
        let connection = format!("{from}-->{to}");
        if ERROR_PATH.is_match(to) {
            error_path.push(connection);
        } else {
            lines.push(connection);
        }
    }

    lines.extend(error_path);
    lines.push("%% Mermaid end".to_string());
    lines.join("\n") + "\n"
}
