//! config.rs
//!
//! Simulation settings, stored as pretty-printed JSON. Every field has a
//! default so partial files are accepted.

use std::{fmt, fs, path::Path};

use clap::ValueEnum;
use frostbyte_common::Parameters;
use frostbyte_consensus::Algorithm;
use serde::{Deserialize, Serialize};

use crate::errors::SimError;

/// How participants are scheduled within a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Every unfinalized honest participant polls, then all of them record.
    #[default]
    Lockstep,
    /// A single unfinalized honest participant, picked at random, polls.
    #[value(name = "random")]
    RandomSampling,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Lockstep => write!(f, "lockstep"),
            Mode::RandomSampling => write!(f, "random"),
        }
    }
}

/// When a run counts as done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    /// Every honest participant has finalized.
    #[default]
    Full,
    /// More than half of the honest participants have finalized.
    Partial,
}

impl fmt::Display for Finality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finality::Full => write!(f, "full"),
            Finality::Partial => write!(f, "partial"),
        }
    }
}

/// How many participants of each kind the network holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub honest: usize,
    pub fixed: usize,
    /// Liveness attackers, answering with the honest minority preference.
    pub liveness: usize,
    pub offline: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            honest: 100,
            fixed: 0,
            liveness: 0,
            offline: 0,
        }
    }
}

impl Layout {
    pub fn total(&self) -> usize {
        self.honest + self.fixed + self.liveness + self.offline
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub params: Parameters,
    pub layout: Layout,
    /// Number of competing candidates.
    pub colors: usize,
    /// Independent runs; run `i` is seeded with `seed + i`.
    pub runs: usize,
    pub seed: u64,
    /// Runs that have not finalized after this many rounds are cut off.
    pub max_rounds: u64,
    pub algorithm: Algorithm,
    pub mode: Mode,
    pub finality: Finality,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            params: Parameters::default(),
            layout: Layout::default(),
            colors: 2,
            runs: 10,
            seed: 0,
            max_rounds: 10_000,
            algorithm: Algorithm::Tree,
            mode: Mode::Lockstep,
            finality: Finality::Full,
        }
    }
}

impl SimConfig {
    /// Checks that a network can be built and sampled from this config.
    pub fn validate(&self) -> Result<(), SimError> {
        self.params.verify()?;

        if self.layout.honest == 0 {
            return Err(SimError::InvalidLayout(
                "at least one honest participant is required".to_string(),
            ));
        }
        if self.colors == 0 {
            return Err(SimError::InvalidLayout(
                "at least one candidate color is required".to_string(),
            ));
        }
        let peers = self.layout.total() - 1;
        if (peers as u64) < self.params.k {
            return Err(SimError::InvalidLayout(format!(
                "K = {} but each participant only has {} peers",
                self.params.k, peers
            )));
        }
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let data = fs::read_to_string(path)?;
        let parsed = serde_json::from_str::<SimConfig>(&data)?;
        Ok(parsed)
    }
}
