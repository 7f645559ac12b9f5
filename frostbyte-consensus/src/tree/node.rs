use std::fmt;

use frostbyte_common::{Bag, Bit, DecisionId, Parameters};

use super::binary::BinaryNode;
use super::snapshot::{NodeKind, NodePath, NodeSnapshot, PathStep};
use super::unary::UnaryNode;
use crate::consensus::Insertion;

/// A node of the decision trie.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Unary(UnaryNode),
    Binary(BinaryNode),
}

impl Node {
    pub(crate) fn leaf(candidate: DecisionId, decided_prefix: usize) -> Self {
        Node::Unary(UnaryNode::leaf(candidate, decided_prefix))
    }

    pub(crate) fn preference(&self) -> DecisionId {
        match self {
            Node::Unary(unary) => unary.preference(),
            Node::Binary(binary) => binary.preference(),
        }
    }

    pub(crate) fn finalized(&self) -> bool {
        match self {
            Node::Unary(unary) => unary.finalized(),
            Node::Binary(binary) => binary.finalized(),
        }
    }

    /// Whether `id` reaches a leaf, i.e. it is one of the candidates.
    pub(crate) fn contains(&self, id: &DecisionId) -> bool {
        match self {
            Node::Unary(unary) => unary.contains(id),
            Node::Binary(binary) => binary.contains(id),
        }
    }

    /// Inserts `id` below this node, replacing the node in place when its
    /// span has to be split.
    pub(crate) fn add(&mut self, id: DecisionId) -> Insertion {
        match self {
            Node::Unary(unary) => {
                let Some(index) = unary.divergence(&id) else {
                    return match unary.child.as_mut() {
                        Some(child) => child.add(id),
                        None => Insertion::Duplicate,
                    };
                };
                if unary.counter.finalized() {
                    return Insertion::Rejected;
                }
                let replacement = unary.split(index, id);
                *self = replacement;
                Insertion::Added
            }
            Node::Binary(binary) => {
                let branch = binary.branch_of(&id);
                if binary.counter.finalized() && branch != binary.counter.preference() {
                    return Insertion::Rejected;
                }
                binary.children[branch.index()].add(id)
            }
        }
    }

    pub(crate) fn record_poll(&mut self, votes: &Bag, params: &Parameters) {
        match self {
            Node::Unary(unary) => unary.record_poll(votes, params),
            Node::Binary(binary) => binary.record_poll(votes, params),
        }
    }

    /// Appends the snapshot of this subtree, in pre-order, to `out`.
    pub(crate) fn collect(&self, path: NodePath, out: &mut Vec<NodeSnapshot>) {
        match self {
            Node::Unary(unary) => {
                out.push(NodeSnapshot {
                    path: path.clone(),
                    kind: NodeKind::Unary,
                    decided_prefix: unary.decided_prefix,
                    common_prefix: Some(unary.common_prefix),
                    branch_bit: None,
                    preference: unary.preference(),
                    confidence: unary.counter.confidence(),
                    finalized: unary.counter.finalized(),
                    weights: None,
                    leaf: unary.is_leaf(),
                });
                if let Some(child) = &unary.child {
                    child.collect(path.child(PathStep::Child), out);
                }
            }
            Node::Binary(binary) => {
                out.push(NodeSnapshot {
                    path: path.clone(),
                    kind: NodeKind::Binary,
                    decided_prefix: binary.branch_bit,
                    common_prefix: None,
                    branch_bit: Some(binary.branch_bit),
                    preference: binary.preference(),
                    confidence: binary.counter.confidence(),
                    finalized: binary.counter.finalized(),
                    weights: Some([
                        binary.counter.weight(Bit::Zero),
                        binary.counter.weight(Bit::One),
                    ]),
                    leaf: false,
                });
                for bit in Bit::ALL {
                    binary.children[bit.index()].collect(path.child(PathStep::Branch(bit)), out);
                }
            }
        }
    }

    /// Writes one line per node, children indented below their parent.
    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        match self {
            Node::Unary(unary) => {
                write!(
                    f,
                    "{indent}{} Bits = [{}, {})",
                    unary.counter, unary.decided_prefix, unary.common_prefix
                )?;
                match &unary.child {
                    Some(child) => {
                        writeln!(f)?;
                        child.render(f, depth + 1)
                    }
                    None => writeln!(f, " Leaf = {}", unary.witness.short()),
                }
            }
            Node::Binary(binary) => {
                writeln!(f, "{indent}{} Bit = {}", binary.counter, binary.branch_bit)?;
                for child in &binary.children {
                    child.render(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}
