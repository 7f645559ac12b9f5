use std::collections::BTreeMap;
use std::fmt;

use frostbyte_common::{Bag, DecisionId};
use frostbyte_consensus::Consensus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Honest,
    Fixed,
    Liveness,
    Offline,
}

/// What a liveness attacker knows about the network: the candidate colors
/// and how many honest participants currently prefer each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minority {
    colors: Vec<DecisionId>,
    distribution: BTreeMap<DecisionId, usize>,
}

impl Minority {
    pub fn new(colors: Vec<DecisionId>) -> Self {
        Self {
            colors,
            distribution: BTreeMap::new(),
        }
    }

    pub fn update(&mut self, distribution: BTreeMap<DecisionId, usize>) {
        self.distribution = distribution;
    }

    /// The least preferred color. Ties go to the later color, so an
    /// even split is answered with the second one.
    pub fn answer(&self) -> Option<DecisionId> {
        self.colors
            .iter()
            .rev()
            .min_by_key(|color| self.distribution.get(*color).copied().unwrap_or(0))
            .copied()
    }
}

/// A member of the simulated network.
pub enum Participant {
    /// Runs its own consensus instance and answers with its preference.
    Honest(Box<dyn Consensus>),
    /// Always answers with the same candidate.
    Fixed(DecisionId),
    /// Answers with whatever the honest participants prefer least, to keep
    /// them from settling.
    Liveness(Minority),
    /// Never answers.
    Offline,
}

impl Participant {
    pub fn kind(&self) -> ParticipantKind {
        match self {
            Participant::Honest(_) => ParticipantKind::Honest,
            Participant::Fixed(_) => ParticipantKind::Fixed,
            Participant::Liveness(_) => ParticipantKind::Liveness,
            Participant::Offline => ParticipantKind::Offline,
        }
    }

    pub fn is_honest(&self) -> bool {
        matches!(self, Participant::Honest(_))
    }

    /// Answer to a query, if any.
    pub fn respond(&self) -> Option<DecisionId> {
        match self {
            Participant::Honest(instance) => Some(instance.preference()),
            Participant::Fixed(choice) => Some(*choice),
            Participant::Liveness(view) => view.answer(),
            Participant::Offline => None,
        }
    }

    /// Whether the participant has stopped deciding. Only honest
    /// participants run consensus; the others count as finalized.
    pub fn finalized(&self) -> bool {
        match self {
            Participant::Honest(instance) => instance.finalized(),
            Participant::Fixed(_) | Participant::Liveness(_) | Participant::Offline => true,
        }
    }

    /// Hands the current preference distribution to a liveness attacker.
    pub fn observe(&mut self, distribution: &BTreeMap<DecisionId, usize>) {
        if let Participant::Liveness(view) = self {
            view.update(distribution.clone());
        }
    }

    /// Applies a poll. Only honest participants keep state.
    pub fn record_poll(&mut self, votes: &Bag) {
        if let Participant::Honest(instance) = self {
            instance.record_poll(votes);
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Honest(instance) => write!(f, "Honest({instance})"),
            Participant::Fixed(choice) => write!(f, "Fixed({})", choice.short()),
            Participant::Liveness(view) => match view.answer() {
                Some(choice) => write!(f, "Liveness({})", choice.short()),
                None => write!(f, "Liveness"),
            },
            Participant::Offline => write!(f, "Offline"),
        }
    }
}
