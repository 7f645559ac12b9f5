//! snapshot.rs
//!
//! Read-only views of the decision trie, used by the visualization harness
//! and by tests that check the exact shape of the trie.

use std::fmt;

use frostbyte_common::{Bit, DecisionId};
use serde::{Serialize, Serializer};

/// One step from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// From a unary node to its only child.
    Child,
    /// From a binary node into one of its branches.
    Branch(Bit),
}

/// Location of a node, rendered as `root`, `root.u`, `root.u.0`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<PathStep>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// The path one `step` below `self`.
    pub fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root")?;
        for step in &self.0 {
            match step {
                PathStep::Child => write!(f, ".u")?,
                PathStep::Branch(bit) => write!(f, ".{bit}")?,
            }
        }
        Ok(())
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Unary,
    Binary,
}

/// State of a single node at the time of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    pub path: NodePath,
    pub kind: NodeKind,
    pub decided_prefix: usize,
    /// End of a unary node's span; `None` for binary nodes.
    pub common_prefix: Option<usize>,
    /// Bit a binary node branches on; `None` for unary nodes.
    pub branch_bit: Option<usize>,
    /// The id the subtree rooted here currently prefers.
    pub preference: DecisionId,
    pub confidence: u32,
    /// Finality of this node's own counter, independent of its children.
    pub finalized: bool,
    /// Accumulated weight of branch 0 and branch 1 (binary nodes only).
    pub weights: Option<[u64; 2]>,
    /// Whether this node is a leaf.
    pub leaf: bool,
}

/// Pre-order listing of every node in the trie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeSnapshot {
    pub nodes: Vec<NodeSnapshot>,
}

impl TreeSnapshot {
    /// Looks a node up by its rendered path, e.g. `"root.u.1"`.
    pub fn get(&self, path: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.path.to_string() == path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &NodeSnapshot> + '_ {
        self.nodes.iter().filter(|node| node.leaf)
    }

    pub fn binaries(&self) -> impl Iterator<Item = &NodeSnapshot> + '_ {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        let path = NodePath::root()
            .child(PathStep::Child)
            .child(PathStep::Branch(Bit::Zero))
            .child(PathStep::Branch(Bit::One));
        assert_eq!(path.to_string(), "root.u.0.1");
        assert_eq!(path.depth(), 3);
        assert_eq!(NodePath::root().to_string(), "root");
    }

    #[test]
    fn test_path_serializes_as_string() {
        let path = NodePath::root().child(PathStep::Branch(Bit::One));
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"root.1\"");
    }
}
