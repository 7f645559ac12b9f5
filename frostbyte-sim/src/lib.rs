//! frostbyte-sim
//!
//! Harnesses around the Snowball decision structures: simulated networks of
//! participants, batch statistics, trie/flat comparisons, parameter sweeps
//! and the scripted trie visualization.

pub mod cli;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod network;
pub mod participant;
pub mod runner;
pub mod sampler;
pub mod visualize;

pub use config::{Finality, Layout, Mode, SimConfig};
pub use errors::SimError;
pub use metrics::{summarize, RunStats, Summary};
pub use network::Network;
pub use participant::{Minority, Participant, ParticipantKind};
pub use runner::{compare, default_sweep, run_once, run_simulation, sweep, Comparison, SweepEntry};
pub use sampler::Sampler;
pub use visualize::{visualize, Report, Scenario, Visualization};
