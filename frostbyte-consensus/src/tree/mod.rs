//! tree
//!
//! Snowball over a binary trie of candidate ids. Candidates that agree on a
//! run of bits share a unary node for that run; wherever two candidates
//! first disagree a binary node runs a Snowball instance on that single bit.
//! The trie's preference is found by following preferred branches from the
//! root down to a leaf.

mod binary;
mod node;
mod snapshot;
mod unary;

use std::fmt;

use frostbyte_common::{Bag, DecisionId, Parameters};
use tracing::debug;

use crate::consensus::{Consensus, Insertion};
use crate::errors::ConsensusError;
use node::Node;

pub use snapshot::{NodeKind, NodePath, NodeSnapshot, PathStep, TreeSnapshot};

/// Snowball decision trie over 256-bit candidate ids.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    params: Parameters,
    root: Node,
}

impl DecisionTree {
    /// Builds a trie holding `initial` as its only candidate.
    pub fn new(params: Parameters, initial: DecisionId) -> Result<Self, ConsensusError> {
        params.verify()?;
        debug!(target: "consensus", "decision tree initialized with {} ({})", initial.short(), params);
        Ok(Self {
            params,
            root: Node::leaf(initial, 0),
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Adds a candidate. Candidates already present are a no-op, and so are
    /// candidates that would re-open a prefix that has been finalized.
    pub fn add(&mut self, id: DecisionId) -> Insertion {
        let outcome = if self.root.contains(&id) {
            Insertion::Duplicate
        } else if self.root.finalized() {
            Insertion::Rejected
        } else {
            self.root.add(id)
        };
        debug!(target: "consensus", "add {}: {:?}", id.short(), outcome);
        outcome
    }

    /// Applies one round of votes. Votes for ids that are not candidates are
    /// dropped before any node sees them.
    pub fn record_poll(&mut self, votes: &Bag) {
        let known = votes.filter(|id| self.root.contains(id));
        if known.len() != votes.len() {
            debug!(
                target: "consensus",
                "ignoring {} votes for unknown candidates",
                votes.len() - known.len()
            );
        }
        self.root.record_poll(&known, &self.params);
    }

    pub fn preference(&self) -> DecisionId {
        self.root.preference()
    }

    /// Whether every node on the preferred path has finalized.
    pub fn finalized(&self) -> bool {
        self.root.finalized()
    }

    /// Whether `id` has been added.
    pub fn contains(&self, id: &DecisionId) -> bool {
        self.root.contains(id)
    }

    /// Pre-order view of every node.
    pub fn snapshot(&self) -> TreeSnapshot {
        let mut nodes = Vec::new();
        self.root.collect(NodePath::root(), &mut nodes);
        TreeSnapshot { nodes }
    }
}

impl Consensus for DecisionTree {
    fn parameters(&self) -> &Parameters {
        DecisionTree::parameters(self)
    }

    fn add(&mut self, choice: DecisionId) -> Insertion {
        DecisionTree::add(self, choice)
    }

    fn record_poll(&mut self, votes: &Bag) {
        DecisionTree::record_poll(self, votes)
    }

    fn preference(&self) -> DecisionId {
        DecisionTree::preference(self)
    }

    fn finalized(&self) -> bool {
        DecisionTree::finalized(self)
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.render(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frostbyte_common::NUM_BITS;

    fn id(bits: &str) -> DecisionId {
        DecisionId::from_bit_string(bits).unwrap()
    }

    fn params(k: u64, alpha: u64, beta_virtuous: u32, beta_rogue: u32) -> Parameters {
        Parameters::new(k, alpha, beta_virtuous, beta_rogue)
    }

    fn poll(votes: &[(&str, u64)]) -> Bag {
        votes.iter().map(|(bits, count)| (id(bits), *count)).collect()
    }

    #[test]
    fn test_new_rejects_invalid_parameters() {
        let err = DecisionTree::new(params(1, 2, 1, 1), id("0")).unwrap_err();
        assert!(matches!(err, ConsensusError::InvalidParameters(_)));
    }

    #[test]
    fn test_single_leaf() {
        let tree = DecisionTree::new(params(1, 1, 1, 1), id("101")).unwrap();
        assert_eq!(tree.preference(), id("101"));
        assert!(!tree.finalized());

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.len(), 1);
        let root = snapshot.get("root").unwrap();
        assert!(root.leaf);
        assert_eq!(root.decided_prefix, 0);
        assert_eq!(root.common_prefix, Some(NUM_BITS));
    }

    #[test]
    fn test_first_add_splits_root_leaf() {
        let mut tree = DecisionTree::new(params(1, 1, 1, 2), id("00000000")).unwrap();
        assert_eq!(tree.add(id("00000010")), Insertion::Added);

        let snapshot = tree.snapshot();
        let paths: Vec<String> = snapshot.nodes.iter().map(|n| n.path.to_string()).collect();
        assert_eq!(paths, ["root", "root.u", "root.u.0", "root.u.1"]);

        let head = snapshot.get("root").unwrap();
        assert_eq!(head.kind, NodeKind::Unary);
        assert_eq!((head.decided_prefix, head.common_prefix), (0, Some(6)));

        let fork = snapshot.get("root.u").unwrap();
        assert_eq!(fork.branch_bit, Some(6));
        assert_eq!(fork.preference, id("00000000"));

        let left = snapshot.get("root.u.0").unwrap();
        assert_eq!((left.decided_prefix, left.preference), (7, id("00000000")));
        let right = snapshot.get("root.u.1").unwrap();
        assert_eq!((right.decided_prefix, right.preference), (7, id("00000010")));
    }

    #[test]
    fn test_split_at_bit_zero_has_no_head() {
        let mut tree = DecisionTree::new(params(1, 1, 1, 2), id("1")).unwrap();
        tree.add(id("0"));

        let root = &tree.snapshot().nodes[0];
        assert_eq!(root.kind, NodeKind::Binary);
        assert_eq!(root.branch_bit, Some(0));
        assert_eq!(tree.preference(), id("1"));
    }

    #[test]
    fn test_split_keeps_old_child_when_span_is_empty() {
        let mut tree = DecisionTree::new(params(1, 1, 1, 2), id("00000000")).unwrap();
        tree.add(id("00000010"));
        tree.add(id("00000100"));

        // The head [0, 6) is split at 5; the old fork at 6 hangs directly
        // under the new fork at 5.
        let snapshot = tree.snapshot();
        let head = snapshot.get("root").unwrap();
        assert_eq!(head.common_prefix, Some(5));
        assert_eq!(snapshot.get("root.u").unwrap().branch_bit, Some(5));
        assert_eq!(snapshot.get("root.u.0").unwrap().branch_bit, Some(6));
        let leaf = snapshot.get("root.u.1").unwrap();
        assert!(leaf.leaf);
        assert_eq!(leaf.decided_prefix, 6);
    }

    #[test]
    fn test_split_inside_span_builds_continuation() {
        let mut tree = DecisionTree::new(params(1, 1, 1, 2), id("00000000")).unwrap();
        tree.add(id("00000010"));
        tree.add(id("00100000"));

        let snapshot = tree.snapshot();
        let paths: Vec<String> = snapshot.nodes.iter().map(|n| n.path.to_string()).collect();
        assert_eq!(
            paths,
            ["root", "root.u", "root.u.0", "root.u.0.u", "root.u.0.u.0", "root.u.0.u.1", "root.u.1"]
        );
        let continuation = snapshot.get("root.u.0").unwrap();
        assert_eq!(
            (continuation.decided_prefix, continuation.common_prefix),
            (3, Some(6))
        );
    }

    #[test]
    fn test_add_reports_duplicates() {
        let mut tree = DecisionTree::new(params(1, 1, 1, 2), id("0")).unwrap();
        assert_eq!(tree.add(id("0")), Insertion::Duplicate);
        assert_eq!(tree.add(id("1")), Insertion::Added);
        let before = tree.snapshot();
        assert_eq!(tree.add(id("1")), Insertion::Duplicate);
        assert_eq!(tree.snapshot(), before);
    }

    #[test]
    fn test_add_into_finalized_prefix_is_rejected() {
        let mut tree = DecisionTree::new(params(2, 2, 1, 2), id("00")).unwrap();
        tree.add(id("01"));
        tree.add(id("11"));
        // The fork at bit 0 finalizes on branch 0; the fork at bit 1 sees a
        // split vote and stays open.
        tree.record_poll(&poll(&[("00", 1), ("01", 1)]));
        assert!(!tree.finalized());
        assert!(tree.snapshot().get("root").unwrap().finalized);

        assert_eq!(tree.add(id("10")), Insertion::Rejected);
        assert!(!tree.contains(&id("10")));
        assert_eq!(tree.add(id("011")), Insertion::Added);
    }

    #[test]
    fn test_finalized_tree_rejects_everything_new() {
        let mut tree = DecisionTree::new(params(1, 1, 1, 1), id("0")).unwrap();
        tree.record_poll(&poll(&[("0", 1)]));
        assert!(tree.finalized());
        assert_eq!(tree.add(id("1")), Insertion::Rejected);
        assert_eq!(tree.add(id("0")), Insertion::Duplicate);
    }

    #[test]
    fn test_unknown_votes_are_ignored() {
        let mut tree = DecisionTree::new(params(1, 1, 1, 1), id("00")).unwrap();
        tree.add(id("01"));
        // "000...1" shares the root span with both candidates but is not one.
        let stranger = DecisionId::from_bit_string(&format!("{}1", "0".repeat(255))).unwrap();
        for _ in 0..5 {
            tree.record_poll(&Bag::from_iter([stranger]));
        }
        assert!(!tree.finalized());
        assert_eq!(tree.snapshot().get("root").unwrap().confidence, 0);
    }

    #[test]
    fn test_display_renders_every_node() {
        let mut tree = DecisionTree::new(params(1, 1, 1, 2), id("00000000")).unwrap();
        tree.add(id("00000010"));
        let rendered = tree.to_string();
        assert_eq!(rendered.lines().count(), 4);
        assert!(rendered.starts_with("SF(Confidence = 0, Finalized = false) Bits = [0, 6)"));
        assert!(rendered.contains("Bit = 6"));
        assert!(rendered.contains("Leaf = 02000000"));
    }
}
