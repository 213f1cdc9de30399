use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a destination node waits on one of its dependencies.
///
/// - `And`: required; the destination needs this source to resolve.
/// - `Or`: at least one of the destination's `Or` sources must resolve. The
///   first success obviates the rest.
/// - `CompletionAnd`: required to finish, in either direction; the outcome
///   itself does not propagate.
/// - `Optional`: never waited on, but credited if it resolves before the
///   destination becomes ready.
/// - `Obviated`: an edge that no longer contributes because another edge
///   already satisfied its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    And,
    Or,
    CompletionAnd,
    Optional,
    Obviated,
}

impl DependencyType {
    /// Whether an outstanding entry of this type keeps the destination from
    /// becoming ready.
    pub(crate) fn blocks_readiness(self) -> bool {
        matches!(
            self,
            DependencyType::And | DependencyType::Or | DependencyType::CompletionAnd
        )
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DependencyType::And => "and",
            DependencyType::Or => "or",
            DependencyType::CompletionAnd => "completion-and",
            DependencyType::Optional => "optional",
            DependencyType::Obviated => "obviated",
        };
        f.write_str(name)
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "and" => Ok(DependencyType::And),
            "or" => Ok(DependencyType::Or),
            "completion-and" => Ok(DependencyType::CompletionAnd),
            "optional" => Ok(DependencyType::Optional),
            "obviated" => Ok(DependencyType::Obviated),
            other => Err(format!(
                "invalid dependency type: {other} (expected \"and\", \"or\", \"completion-and\", \"optional\" or \"obviated\")"
            )),
        }
    }
}

/// Lifecycle status of a node.
///
/// Every node starts out `Waiting`. The caller moves it to `Resolved` or
/// `Unresolvable` exactly once via [`crate::Node::resolve`]; both are
/// terminal. A node whose required dependency becomes `Unresolvable` is
/// marked `Unresolvable` by propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Waiting,
    Resolved,
    Unresolvable,
}

impl ResolutionStatus {
    /// `Resolved` and `Unresolvable` are terminal; `Waiting` is not.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ResolutionStatus::Waiting)
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionStatus::Waiting => "waiting",
            ResolutionStatus::Resolved => "resolved",
            ResolutionStatus::Unresolvable => "unresolvable",
        };
        f.write_str(name)
    }
}

impl FromStr for ResolutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "waiting" => Ok(ResolutionStatus::Waiting),
            "resolved" => Ok(ResolutionStatus::Resolved),
            "unresolvable" => Ok(ResolutionStatus::Unresolvable),
            other => Err(format!(
                "invalid resolution status: {other} (expected \"waiting\", \"resolved\" or \"unresolvable\")"
            )),
        }
    }
}
