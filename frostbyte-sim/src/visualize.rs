//! visualize.rs
//!
//! A scripted walk through a small decision trie: four candidates sharing a
//! long prefix, then a fixed sequence of polls. The trie is captured after
//! every round so its evolution can be printed or exported as JSON.

use std::fmt;

use frostbyte_common::{Bag, DecisionId, Parameters, ID_LEN};
use frostbyte_consensus::{DecisionTree, Insertion, TreeSnapshot};
use serde::Serialize;
use tracing::debug;

use crate::errors::SimError;

/// Parameters, candidates and polls of a visualization run. Poll entries
/// index into `candidates`.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub params: Parameters,
    pub candidates: Vec<DecisionId>,
    pub polls: Vec<Vec<(usize, u64)>>,
}

impl Default for Scenario {
    fn default() -> Self {
        // Only the first byte differs: 00000000, 00000010, 00000001, 00000100.
        let candidates = [0b0000_0000u8, 0b0000_0010, 0b0000_0001, 0b0000_0100]
            .iter()
            .map(|first| {
                let mut bytes = [0u8; ID_LEN];
                bytes[0] = *first;
                DecisionId::from_bytes(bytes)
            })
            .collect();
        Self {
            params: Parameters::new(3, 2, 2, 3),
            candidates,
            polls: vec![
                // Quorum for candidate 1 with one dissenting vote.
                vec![(1, 2), (2, 1)],
                // Split vote, no quorum anywhere below the shared prefix.
                vec![(1, 1), (2, 1)],
                // Unanimous for candidate 3.
                vec![(3, 3)],
                // Quorum for candidate 3 with one dissenting vote.
                vec![(3, 2), (2, 1)],
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Vote {
    pub id: DecisionId,
    pub count: u64,
}

/// The trie after one round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub round: usize,
    pub votes: Vec<Vote>,
    pub preference: DecisionId,
    pub finalized: bool,
    pub snapshot: TreeSnapshot,
    pub rendered: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Visualization {
    pub params: Parameters,
    pub candidates: Vec<DecisionId>,
    pub insertions: Vec<String>,
    pub initial: TreeSnapshot,
    pub initial_rendered: String,
    pub rounds: Vec<RoundView>,
}

/// Plays `scenario` and records the trie after each poll. Stops early once
/// the trie finalizes.
pub fn visualize(scenario: &Scenario) -> Result<Visualization, SimError> {
    let Some((first, rest)) = scenario.candidates.split_first() else {
        return Err(SimError::InvalidScenario(
            "a visualization needs at least one candidate".to_string(),
        ));
    };

    let mut tree = DecisionTree::new(scenario.params, *first)?;
    let insertions: Vec<String> = rest
        .iter()
        .map(|id| {
            let outcome: Insertion = tree.add(*id);
            format!("{:?}", outcome)
        })
        .collect();

    let initial = tree.snapshot();
    let initial_rendered = tree.to_string();

    let mut rounds = Vec::with_capacity(scenario.polls.len());
    for (round, entries) in scenario.polls.iter().enumerate() {
        let mut bag = Bag::new();
        for (index, count) in entries {
            let id = scenario.candidates.get(*index).ok_or_else(|| {
                SimError::InvalidScenario(format!("poll {} names unknown candidate {}", round + 1, index))
            })?;
            bag.add_count(*id, *count);
        }

        tree.record_poll(&bag);
        debug!("round {}: preference {}", round + 1, tree.preference().short());

        rounds.push(RoundView {
            round: round + 1,
            votes: bag.iter().map(|(id, count)| Vote { id: *id, count }).collect(),
            preference: tree.preference(),
            finalized: tree.finalized(),
            snapshot: tree.snapshot(),
            rendered: tree.to_string(),
        });
        if tree.finalized() {
            break;
        }
    }

    Ok(Visualization {
        params: scenario.params,
        candidates: scenario.candidates.clone(),
        insertions,
        initial,
        initial_rendered,
        rounds,
    })
}

/// Plain-text report of a [`Visualization`], showing the first `bits` bits
/// of every id.
pub struct Report<'a> {
    visualization: &'a Visualization,
    bits: usize,
}

impl Visualization {
    pub fn report(&self, bits: usize) -> Report<'_> {
        Report {
            visualization: self,
            bits,
        }
    }
}

impl Report<'_> {
    fn write_snapshot(&self, f: &mut fmt::Formatter<'_>, snapshot: &TreeSnapshot) -> fmt::Result {
        for node in &snapshot.nodes {
            let span = match (node.common_prefix, node.branch_bit) {
                (Some(common), _) => format!("bits [{}, {})", node.decided_prefix, common),
                (None, Some(bit)) => format!("bit {}", bit),
                (None, None) => String::new(),
            };
            writeln!(
                f,
                "  - {:<16} {:?} {:<16} pref={} confidence={} finalized={}",
                node.path.to_string(),
                node.kind,
                span,
                node.preference.to_bit_string(self.bits),
                node.confidence,
                node.finalized
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visualization = self.visualization;
        let bits = self.bits;

        writeln!(f, "Parameters: {}", visualization.params)?;
        let outcomes = std::iter::once("Initial").chain(visualization.insertions.iter().map(String::as_str));
        for (id, outcome) in visualization.candidates.iter().zip(outcomes) {
            writeln!(f, "{outcome:>9}: {}", id.to_bit_string(bits))?;
        }
        writeln!(f)?;
        writeln!(f, "{}", visualization.initial_rendered)?;
        self.write_snapshot(f, &visualization.initial)?;

        for round in &visualization.rounds {
            writeln!(f)?;
            writeln!(f, "Round {}:", round.round)?;
            for vote in &round.votes {
                writeln!(f, "  poll {} : {} votes", vote.id.to_bit_string(bits), vote.count)?;
            }
            writeln!(f, "  preference = {}", round.preference.to_bit_string(bits))?;
            writeln!(f, "{}", round.rendered)?;
            self.write_snapshot(f, &round.snapshot)?;
            if round.finalized {
                writeln!(f, "Finalized on {}", round.preference.to_bit_string(bits))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let scenario = Scenario::default();
        let visualization = visualize(&scenario).unwrap();

        assert_eq!(visualization.insertions, vec!["Added"; 3]);
        assert_eq!(visualization.initial.len(), 8);
        assert_eq!(visualization.rounds.len(), 4);
        for round in &visualization.rounds {
            assert_eq!(round.preference, scenario.candidates[1]);
            assert!(!round.finalized);
        }
        // The fork at bit 5 settles on branch 0 in round 2.
        assert!(!visualization.rounds[0].snapshot.get("root.u").unwrap().finalized);
        assert!(visualization.rounds[1].snapshot.get("root.u").unwrap().finalized);
    }

    #[test]
    fn test_stops_when_finalized() {
        let scenario = Scenario {
            params: Parameters::new(1, 1, 1, 1),
            polls: vec![vec![(2, 1)], vec![(0, 1)]],
            ..Scenario::default()
        };
        let visualization = visualize(&scenario).unwrap();
        assert_eq!(visualization.rounds.len(), 1);
        assert!(visualization.rounds[0].finalized);
        assert_eq!(visualization.rounds[0].preference, scenario.candidates[2]);

        let text = visualization.report(8).to_string();
        assert!(text.contains("Finalized on 00000001"));
    }

    #[test]
    fn test_unknown_candidate_in_poll() {
        let scenario = Scenario {
            polls: vec![vec![(9, 1)]],
            ..Scenario::default()
        };
        assert!(matches!(visualize(&scenario), Err(SimError::InvalidScenario(_))));
    }

    #[test]
    fn test_empty_scenario() {
        let scenario = Scenario {
            candidates: Vec::new(),
            ..Scenario::default()
        };
        let err = visualize(&scenario).unwrap_err();
        assert!(matches!(err, SimError::InvalidScenario(_)));
        assert!(err.to_string().starts_with("Invalid scenario"));
    }

    #[test]
    fn test_report_and_json() {
        let visualization = visualize(&Scenario::default()).unwrap();
        let text = visualization.report(8).to_string();
        assert!(text.starts_with("Parameters: K = 3, Alpha = 2"));
        assert!(text.contains("  Initial: 00000000\n    Added: 00000010"));
        assert!(text.contains("Round 4:"));
        assert!(text.contains("poll 00000010 : 2 votes"));
        assert!(text.contains("preference = 00000010"));

        let json = serde_json::to_value(&visualization).unwrap();
        assert_eq!(json["rounds"].as_array().unwrap().len(), 4);
        assert_eq!(json["rounds"][0]["snapshot"]["nodes"][0]["path"], "root");
    }
}
