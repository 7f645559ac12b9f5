//! flat.rs
//!
//! Baseline Snowball: a single preference counter over whole candidate ids,
//! with no prefix structure. It decides the same way as the trie and serves
//! as the reference the trie is checked against.

use std::collections::BTreeSet;
use std::fmt;

use frostbyte_common::{Bag, DecisionId, Parameters};
use tracing::{debug, trace};

use crate::consensus::{Consensus, Insertion};
use crate::errors::ConsensusError;
use crate::snowball::PreferenceCounter;

#[derive(Debug, Clone)]
pub struct Flat {
    params: Parameters,
    candidates: BTreeSet<DecisionId>,
    counter: PreferenceCounter<DecisionId>,
}

impl Flat {
    pub fn new(params: Parameters, initial: DecisionId) -> Result<Self, ConsensusError> {
        params.verify()?;
        debug!(target: "consensus", "flat instance initialized with {} ({})", initial.short(), params);
        Ok(Self {
            params,
            candidates: BTreeSet::from([initial]),
            counter: PreferenceCounter::new(initial),
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Adds a candidate. A new candidate changes the decision being made,
    /// so the counter restarts from zero, keeping only the current preference.
    pub fn add(&mut self, id: DecisionId) -> Insertion {
        let outcome = if self.candidates.contains(&id) {
            Insertion::Duplicate
        } else if self.counter.finalized() {
            Insertion::Rejected
        } else {
            self.candidates.insert(id);
            self.counter = PreferenceCounter::new(self.counter.preference());
            Insertion::Added
        };
        debug!(target: "consensus", "add {}: {:?}", id.short(), outcome);
        outcome
    }

    /// Applies one round of votes; votes for non-candidates are ignored.
    pub fn record_poll(&mut self, votes: &Bag) {
        let outcome = self.counter.record_votes(
            votes
                .iter()
                .filter(|(id, _)| self.candidates.contains(*id))
                .map(|(id, count)| (*id, count)),
            &self.params,
        );
        trace!(
            target: "consensus",
            "flat poll of {} votes, winner {:?} ({:?})",
            votes.len(),
            outcome.winner,
            outcome.kind
        );
    }

    pub fn preference(&self) -> DecisionId {
        self.counter.preference()
    }

    pub fn finalized(&self) -> bool {
        self.counter.finalized()
    }

    pub fn contains(&self, id: &DecisionId) -> bool {
        self.candidates.contains(id)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &DecisionId> + '_ {
        self.candidates.iter()
    }

    pub fn confidence(&self) -> u32 {
        self.counter.confidence()
    }
}

impl Consensus for Flat {
    fn parameters(&self) -> &Parameters {
        Flat::parameters(self)
    }

    fn add(&mut self, choice: DecisionId) -> Insertion {
        Flat::add(self, choice)
    }

    fn record_poll(&mut self, votes: &Bag) {
        Flat::record_poll(self, votes)
    }

    fn preference(&self) -> DecisionId {
        Flat::preference(self)
    }

    fn finalized(&self) -> bool {
        Flat::finalized(self)
    }
}

impl fmt::Display for Flat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Flat(Candidates = {}, Preference = {}, Confidence = {}, Finalized = {})",
            self.candidates.len(),
            self.preference().short(),
            self.counter.confidence(),
            self.counter.finalized()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(bits: &str) -> DecisionId {
        DecisionId::from_bit_string(bits).unwrap()
    }

    #[test]
    fn test_add_outcomes() {
        let mut flat = Flat::new(Parameters::new(1, 1, 1, 1), id("0")).unwrap();
        assert_eq!(flat.add(id("0")), Insertion::Duplicate);
        assert_eq!(flat.add(id("1")), Insertion::Added);
        assert_eq!(flat.candidates().count(), 2);

        flat.record_poll(&Bag::from_iter([id("1")]));
        assert!(flat.finalized());
        assert_eq!(flat.add(id("11")), Insertion::Rejected);
        assert!(!flat.contains(&id("11")));
    }

    #[test]
    fn test_unknown_votes_do_not_count() {
        let mut flat = Flat::new(Parameters::new(1, 1, 1, 1), id("0")).unwrap();
        for _ in 0..3 {
            flat.record_poll(&Bag::from_iter([id("1")]));
        }
        assert!(!flat.finalized());
        assert_eq!(flat.preference(), id("0"));
    }

    #[test]
    fn test_rogue_round_uses_beta_rogue() {
        let mut flat = Flat::new(Parameters::new(3, 2, 1, 2), id("00")).unwrap();
        flat.add(id("01"));

        let rogue: Bag = [(id("00"), 1), (id("01"), 2)].into_iter().collect();
        flat.record_poll(&rogue);
        assert_eq!(flat.preference(), id("01"));
        assert!(!flat.finalized());

        flat.record_poll(&rogue);
        assert!(flat.finalized());
        assert_eq!(flat.confidence(), 2);
    }

    #[test]
    fn test_add_restarts_counter() {
        let mut flat = Flat::new(Parameters::new(1, 1, 2, 2), id("0")).unwrap();
        flat.record_poll(&Bag::from_iter([id("0")]));
        assert_eq!(flat.confidence(), 1);

        assert_eq!(flat.add(id("1")), Insertion::Added);
        assert_eq!(flat.confidence(), 0);
        assert_eq!(flat.preference(), id("0"));

        flat.record_poll(&Bag::from_iter([id("0")]));
        assert!(!flat.finalized());
    }

    #[test]
    fn test_add_forgets_accumulated_weight() {
        let mut flat = Flat::new(Parameters::new(3, 2, 10, 10), id("0")).unwrap();
        for _ in 0..3 {
            flat.record_poll(&[(id("0"), 3)].into_iter().collect());
        }
        flat.add(id("1"));
        flat.record_poll(&[(id("1"), 2)].into_iter().collect());
        assert_eq!(flat.preference(), id("1"));
    }

    #[test]
    fn test_display() {
        let flat = Flat::new(Parameters::new(1, 1, 1, 1), id("1")).unwrap();
        assert_eq!(
            flat.to_string(),
            "Flat(Candidates = 1, Preference = 80000000, Confidence = 0, Finalized = false)"
        );
    }
}
