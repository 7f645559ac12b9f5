//! metrics.rs
//!
//! Per-run statistics and their aggregation over many runs.

use std::collections::BTreeMap;
use std::fmt;

use frostbyte_common::DecisionId;
use serde::{Deserialize, Serialize};

/// Outcome of one simulated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Rounds executed before the run stopped.
    pub rounds: u64,
    /// First round after which more than half of the honest participants
    /// had finalized.
    pub rounds_to_partial: Option<u64>,
    /// Round after which every honest participant had finalized.
    pub rounds_to_full: Option<u64>,
    /// Round in which each honest participant finalized, by index.
    pub per_node_rounds: BTreeMap<usize, u64>,
    /// Final preference of the honest participants.
    pub distribution: BTreeMap<DecisionId, usize>,
    pub agreement: bool,
    pub disagreement: bool,
}

/// Aggregate over a batch of runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub runs: usize,
    pub finalized_runs: usize,
    pub disagreements: usize,
    pub avg_rounds_to_full: Option<f64>,
    pub avg_rounds_to_partial: Option<f64>,
    pub avg_node_finalization: Option<f64>,
    pub min_node_finalization: Option<u64>,
    pub max_node_finalization: Option<u64>,
    pub final_preference_distribution: BTreeMap<DecisionId, usize>,
}

fn average(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<u64>() as f64 / values.len() as f64)
}

pub fn summarize(results: &[RunStats]) -> Summary {
    let full: Vec<u64> = results.iter().filter_map(|r| r.rounds_to_full).collect();
    let partial: Vec<u64> = results.iter().filter_map(|r| r.rounds_to_partial).collect();
    let per_node: Vec<u64> = results
        .iter()
        .flat_map(|r| r.per_node_rounds.values().copied())
        .collect();

    let mut distribution = BTreeMap::new();
    for result in results {
        for (choice, count) in &result.distribution {
            *distribution.entry(*choice).or_default() += count;
        }
    }

    Summary {
        runs: results.len(),
        finalized_runs: full.len(),
        disagreements: results.iter().filter(|r| r.disagreement).count(),
        avg_rounds_to_full: average(&full),
        avg_rounds_to_partial: average(&partial),
        avg_node_finalization: average(&per_node),
        min_node_finalization: per_node.iter().min().copied(),
        max_node_finalization: per_node.iter().max().copied(),
        final_preference_distribution: distribution,
    }
}

fn optional<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "runs:                    {}", self.runs)?;
        writeln!(f, "finalized runs:          {}", self.finalized_runs)?;
        writeln!(f, "disagreements:           {}", self.disagreements)?;
        writeln!(
            f,
            "avg rounds to full:      {}",
            optional(&self.avg_rounds_to_full.map(|v| format!("{v:.2}")))
        )?;
        writeln!(
            f,
            "avg rounds to partial:   {}",
            optional(&self.avg_rounds_to_partial.map(|v| format!("{v:.2}")))
        )?;
        writeln!(
            f,
            "node finalization:       min {} / avg {} / max {}",
            optional(&self.min_node_finalization),
            optional(&self.avg_node_finalization.map(|v| format!("{v:.2}"))),
            optional(&self.max_node_finalization)
        )?;
        write!(f, "final preferences:      ")?;
        for (choice, count) in &self.final_preference_distribution {
            write!(f, " {}:{}", choice.short(), count)?;
        }
        writeln!(f)
    }
}
