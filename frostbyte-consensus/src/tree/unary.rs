use frostbyte_common::{Bag, Bit, DecisionId, Parameters, NUM_BITS};
use tracing::trace;

use super::binary::BinaryNode;
use super::node::Node;
use crate::snowball::ConfidenceCounter;

/// A run of bits on which every candidate below this node agrees.
///
/// The node covers bits `[decided_prefix, common_prefix)`; its child, if any,
/// starts at `common_prefix`. A node without a child is a leaf: its span
/// runs to the end of the id and `witness` is the candidate itself.
#[derive(Debug, Clone)]
pub(crate) struct UnaryNode {
    pub(super) decided_prefix: usize,
    pub(super) common_prefix: usize,
    /// Any candidate below this node; its bits in the span are the span's bits.
    pub(super) witness: DecisionId,
    pub(super) counter: ConfidenceCounter,
    pub(super) child: Option<Box<Node>>,
}

impl UnaryNode {
    pub(super) fn leaf(candidate: DecisionId, decided_prefix: usize) -> Self {
        Self {
            decided_prefix,
            common_prefix: NUM_BITS,
            witness: candidate,
            counter: ConfidenceCounter::new(),
            child: None,
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.child.is_none()
    }

    /// First bit inside the span where `id` leaves it.
    pub(super) fn divergence(&self, id: &DecisionId) -> Option<usize> {
        self.witness
            .first_difference(id, self.decided_prefix, self.common_prefix)
    }

    pub(super) fn preference(&self) -> DecisionId {
        match &self.child {
            Some(child) => child.preference(),
            None => self.witness,
        }
    }

    pub(super) fn finalized(&self) -> bool {
        self.counter.finalized() && self.child.as_ref().map_or(true, |child| child.finalized())
    }

    pub(super) fn contains(&self, id: &DecisionId) -> bool {
        self.divergence(id).is_none() && self.child.as_ref().map_or(true, |child| child.contains(id))
    }

    /// Splits the span at `index`, where the new candidate `id` first
    /// disagrees with the witness, and returns the subtree that replaces this
    /// node. Every node built here starts with fresh counters.
    pub(super) fn split(&mut self, index: usize, id: DecisionId) -> Node {
        let existing = self.witness.bit(index);
        debug_assert_ne!(existing, id.bit(index));

        let continuation = match self.child.take() {
            Some(child) if index + 1 == self.common_prefix => *child,
            child => Node::Unary(UnaryNode {
                decided_prefix: index + 1,
                common_prefix: self.common_prefix,
                witness: self.witness,
                counter: ConfidenceCounter::new(),
                child,
            }),
        };
        let new_leaf = Node::Unary(UnaryNode::leaf(id, index + 1));

        let children = match existing {
            Bit::Zero => [continuation, new_leaf],
            Bit::One => [new_leaf, continuation],
        };
        let fork = Node::Binary(BinaryNode::new(index, existing, children));

        if index == self.decided_prefix {
            return fork;
        }
        Node::Unary(UnaryNode {
            decided_prefix: self.decided_prefix,
            common_prefix: index,
            witness: self.witness,
            counter: ConfidenceCounter::new(),
            child: Some(Box::new(fork)),
        })
    }

    /// Counts the votes consistent with this span and hands them on to the
    /// child.
    pub(super) fn record_poll(&mut self, votes: &Bag, params: &Parameters) {
        let consistent = votes.filter(|id| self.divergence(id).is_none());

        if consistent.len() >= params.alpha {
            self.counter.record_success(params.beta_virtuous);
        } else {
            self.counter.record_failure();
        }
        trace!(
            target: "consensus",
            "unary [{}, {}) received {} of {} votes: {}",
            self.decided_prefix,
            self.common_prefix,
            consistent.len(),
            votes.len(),
            self.counter
        );

        if let Some(child) = self.child.as_mut() {
            child.record_poll(&consistent, params);
        }
    }
}
