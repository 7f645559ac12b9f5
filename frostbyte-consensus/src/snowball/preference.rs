use std::collections::BTreeMap;
use std::fmt;

use frostbyte_common::Parameters;

use super::confidence::ConfidenceCounter;

/// How the votes of a round were spread over the choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    /// Every vote went to the same choice.
    Virtuous,
    /// Votes were split between several choices (or none were cast).
    Rogue,
}

/// What a single round did to a [`PreferenceCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome<C> {
    /// The choice that reached the quorum, if any did.
    pub winner: Option<C>,
    pub kind: RoundKind,
}

/// Snowball state over an ordered set of choices.
///
/// Keeps the accumulated quorum weight of every choice, the current
/// preference (the heaviest choice so far) and the winner of the most recent
/// successful round. Confidence only grows while consecutive rounds are won
/// by the same choice. Once finalized, the preference is frozen at that
/// choice.
#[derive(Debug, Clone)]
pub struct PreferenceCounter<C> {
    preference: C,
    last_winner: C,
    weights: BTreeMap<C, u64>,
    confidence: ConfidenceCounter,
}

impl<C: Copy + Ord> PreferenceCounter<C> {
    pub fn new(initial: C) -> Self {
        Self {
            preference: initial,
            last_winner: initial,
            weights: BTreeMap::new(),
            confidence: ConfidenceCounter::new(),
        }
    }

    /// Feeds one round of per-choice vote counts.
    ///
    /// Each choice must appear at most once in `votes`.
    pub fn record_votes<I>(&mut self, votes: I, params: &Parameters) -> RoundOutcome<C>
    where
        I: IntoIterator<Item = (C, u64)>,
    {
        let mut voted = 0usize;
        let mut winner: Option<(C, u64)> = None;

        for (choice, count) in votes {
            if count == 0 {
                continue;
            }
            voted += 1;
            if count < params.alpha {
                continue;
            }
            winner = match winner {
                Some((best, best_count)) if !self.beats(choice, count, best, best_count) => {
                    Some((best, best_count))
                }
                _ => Some((choice, count)),
            };
        }

        let kind = if voted == 1 {
            RoundKind::Virtuous
        } else {
            RoundKind::Rogue
        };

        let Some((choice, count)) = winner else {
            self.confidence.record_failure();
            return RoundOutcome { winner: None, kind };
        };

        if !self.confidence.finalized() {
            let weight = {
                let entry = self.weights.entry(choice).or_default();
                *entry += count;
                *entry
            };
            if weight >= self.weight(self.preference) {
                self.preference = choice;
            }
        }

        if choice != self.last_winner {
            self.confidence.record_failure();
            if !self.confidence.finalized() {
                self.last_winner = choice;
            }
        }

        let threshold = match kind {
            RoundKind::Virtuous => params.beta_virtuous,
            RoundKind::Rogue => params.beta_rogue,
        };
        self.confidence.record_success(threshold);

        RoundOutcome {
            winner: Some(choice),
            kind,
        }
    }

    /// Tie-break between two quorum-reaching choices: the larger count wins,
    /// equal counts keep the current preference, otherwise the smaller choice.
    fn beats(&self, challenger: C, count: u64, best: C, best_count: u64) -> bool {
        if count != best_count {
            return count > best_count;
        }
        if best == self.preference {
            return false;
        }
        challenger == self.preference || challenger < best
    }

    /// The preferred choice. After finalization this is the choice that was
    /// winning when the counter finalized.
    pub fn preference(&self) -> C {
        if self.confidence.finalized() {
            self.last_winner
        } else {
            self.preference
        }
    }

    /// Winner of the most recent successful round.
    pub fn last_winner(&self) -> C {
        self.last_winner
    }

    /// Accumulated quorum weight of `choice`.
    pub fn weight(&self, choice: C) -> u64 {
        self.weights.get(&choice).copied().unwrap_or(0)
    }

    pub fn confidence(&self) -> u32 {
        self.confidence.confidence()
    }

    pub fn finalized(&self) -> bool {
        self.confidence.finalized()
    }
}

impl<C: Copy + Ord + fmt::Display> fmt::Display for PreferenceCounter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SB(Preference = {}, Weights = [", self.preference())?;
        for (i, (choice, weight)) in self.weights.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{choice}: {weight}")?;
        }
        write!(f, "], {})", self.confidence)
    }
}
