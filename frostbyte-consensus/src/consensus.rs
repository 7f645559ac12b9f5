//! consensus.rs
//!
//! The interface shared by the decision trie and the flat baseline, so that
//! harnesses can drive either one.

use std::fmt;
use std::str::FromStr;

use frostbyte_common::{Bag, DecisionId, Parameters};
use serde::{Deserialize, Serialize};

use crate::errors::ConsensusError;
use crate::flat::Flat;
use crate::tree::DecisionTree;

/// Result of adding a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The candidate is new and now takes part in the decision.
    Added,
    /// The candidate was already present; nothing changed.
    Duplicate,
    /// The candidate conflicts with a decision that is already final.
    Rejected,
}

/// A single Snowball decision over a growing set of candidates.
pub trait Consensus: fmt::Display {
    fn parameters(&self) -> &Parameters;

    /// Adds a candidate; see [`Insertion`] for the possible outcomes.
    fn add(&mut self, choice: DecisionId) -> Insertion;

    /// Applies the votes of one sampling round.
    fn record_poll(&mut self, votes: &Bag);

    /// The currently preferred candidate.
    fn preference(&self) -> DecisionId;

    /// Whether the preference can no longer change.
    fn finalized(&self) -> bool;
}

/// Which decision structure to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Tree,
    Flat,
}

impl Algorithm {
    /// Builds a fresh instance holding `initial` as its only candidate.
    pub fn build(
        self,
        params: Parameters,
        initial: DecisionId,
    ) -> Result<Box<dyn Consensus>, ConsensusError> {
        Ok(match self {
            Algorithm::Tree => Box::new(DecisionTree::new(params, initial)?),
            Algorithm::Flat => Box::new(Flat::new(params, initial)?),
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Tree => write!(f, "tree"),
            Algorithm::Flat => write!(f, "flat"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = ConsensusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(Algorithm::Tree),
            "flat" => Ok(Algorithm::Flat),
            other => Err(ConsensusError::UnknownAlgorithm(other.to_string())),
        }
    }
}
