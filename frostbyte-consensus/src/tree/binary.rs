use frostbyte_common::{Bag, Bit, DecisionId, Parameters};
use tracing::trace;

use super::node::Node;
use crate::snowball::PreferenceCounter;

/// A fork on a single bit. Both branches always exist.
#[derive(Debug, Clone)]
pub(crate) struct BinaryNode {
    pub(super) branch_bit: usize,
    pub(super) counter: PreferenceCounter<Bit>,
    pub(super) children: [Box<Node>; 2],
}

impl BinaryNode {
    /// A fresh fork at `branch_bit` preferring `preferred`, the side the
    /// trie already held before the new candidate arrived.
    pub(super) fn new(branch_bit: usize, preferred: Bit, children: [Node; 2]) -> Self {
        let [zero, one] = children;
        Self {
            branch_bit,
            counter: PreferenceCounter::new(preferred),
            children: [Box::new(zero), Box::new(one)],
        }
    }

    pub(super) fn preferred_child(&self) -> &Node {
        &self.children[self.counter.preference().index()]
    }

    pub(super) fn preference(&self) -> DecisionId {
        self.preferred_child().preference()
    }

    pub(super) fn finalized(&self) -> bool {
        self.counter.finalized() && self.preferred_child().finalized()
    }

    pub(super) fn branch_of(&self, id: &DecisionId) -> Bit {
        id.bit(self.branch_bit)
    }

    pub(super) fn contains(&self, id: &DecisionId) -> bool {
        self.children[self.branch_of(id).index()].contains(id)
    }

    /// Splits the votes on the branch bit, updates the fork's counter with
    /// the per-branch totals and recurses into both branches.
    pub(super) fn record_poll(&mut self, votes: &Bag, params: &Parameters) {
        let [zeros, ones] = votes.split(self.branch_bit);
        let outcome = self.counter.record_votes(
            [(Bit::Zero, zeros.len()), (Bit::One, ones.len())],
            params,
        );
        trace!(
            target: "consensus",
            "binary @{} split votes {}/{} ({:?}): {}",
            self.branch_bit,
            zeros.len(),
            ones.len(),
            outcome.kind,
            self.counter
        );

        let [zero, one] = &mut self.children;
        zero.record_poll(&zeros, params);
        one.record_poll(&ones, params);
    }
}
