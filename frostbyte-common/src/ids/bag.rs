use std::collections::BTreeMap;
use std::fmt;

use super::decision_id::{Bit, DecisionId};

/// One round's vote tally: how many sampled peers answered with each id.
///
/// Iteration is ordered by id so that everything derived from a bag is
/// reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bag {
    counts: BTreeMap<DecisionId, u64>,
    size: u64,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single vote for `id`.
    pub fn add(&mut self, id: DecisionId) {
        self.add_count(id, 1);
    }

    /// Records `count` votes for `id`. Zero counts leave the bag untouched.
    pub fn add_count(&mut self, id: DecisionId, count: u64) {
        if count == 0 {
            return;
        }
        *self.counts.entry(id).or_default() += count;
        self.size += count;
    }

    /// Votes recorded for `id`.
    pub fn count(&self, id: &DecisionId) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Total number of votes in the bag.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of distinct ids that received at least one vote.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DecisionId, u64)> + '_ {
        self.counts.iter().map(|(id, count)| (id, *count))
    }

    /// Ids with at least one vote, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &DecisionId> + '_ {
        self.counts.keys()
    }

    /// Keeps only the votes whose id satisfies `keep`.
    pub fn filter<F>(&self, mut keep: F) -> Bag
    where
        F: FnMut(&DecisionId) -> bool,
    {
        self.iter()
            .filter(|(id, _)| keep(id))
            .map(|(id, count)| (*id, count))
            .collect()
    }

    /// Partitions the votes by the value of bit `index`; element 0 holds the
    /// ids with a zero at that position.
    pub fn split(&self, index: usize) -> [Bag; 2] {
        let mut halves = [Bag::new(), Bag::new()];
        for (id, count) in self.iter() {
            halves[id.bit(index).index()].add_count(*id, count);
        }
        halves
    }

    /// Votes per branch at bit `index`, without building the sub-bags.
    pub fn split_counts(&self, index: usize) -> [(Bit, u64); 2] {
        let mut totals = [(Bit::Zero, 0), (Bit::One, 0)];
        for (id, count) in self.iter() {
            totals[id.bit(index).index()].1 += count;
        }
        totals
    }

    /// The id with the most votes; ties go to the smallest id.
    pub fn mode(&self) -> Option<(DecisionId, u64)> {
        self.iter().fold(None, |best, (id, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((*id, count)),
        })
    }
}

impl FromIterator<(DecisionId, u64)> for Bag {
    fn from_iter<I: IntoIterator<Item = (DecisionId, u64)>>(iter: I) -> Self {
        let mut bag = Bag::new();
        bag.extend(iter);
        bag
    }
}

impl FromIterator<DecisionId> for Bag {
    fn from_iter<I: IntoIterator<Item = DecisionId>>(iter: I) -> Self {
        iter.into_iter().map(|id| (id, 1)).collect()
    }
}

impl Extend<(DecisionId, u64)> for Bag {
    fn extend<I: IntoIterator<Item = (DecisionId, u64)>>(&mut self, iter: I) {
        for (id, count) in iter {
            self.add_count(id, count);
        }
    }
}

impl fmt::Display for Bag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bag(size = {})", self.size)?;
        for (id, count) in self.iter() {
            write!(f, " {}:{}", id.short(), count)?;
        }
        Ok(())
    }
}
