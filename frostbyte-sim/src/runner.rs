//! runner.rs
//!
//! Batch drivers: repeated runs of one configuration, side-by-side runs of
//! the trie and the flat baseline on identical seeds, and sweeps over
//! parameter sets.

use frostbyte_common::Parameters;
use frostbyte_consensus::Algorithm;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{Finality, SimConfig};
use crate::errors::SimError;
use crate::metrics::{summarize, RunStats, Summary};
use crate::network::Network;

/// Seed of run `run` in a batch starting at `seed`.
pub fn run_seed(seed: u64, run: usize) -> u64 {
    seed.wrapping_add(run as u64)
}

/// Builds a network from `seed` and rounds it until it reaches
/// `config.finality` or the round cap is hit.
pub fn run_once(config: &SimConfig, seed: u64) -> Result<Network, SimError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut network = Network::new(config, &mut rng)?;
    while !network.reached(config.finality) && network.rounds() < config.max_rounds {
        network.round(&mut rng);
    }
    if !network.reached(config.finality) {
        warn!(
            "seed {}: round cap of {} reached before {} finality",
            seed, config.max_rounds, config.finality
        );
    }
    Ok(network)
}

/// Runs `config.runs` independent simulations.
pub fn run_simulation(config: &SimConfig) -> Result<Vec<RunStats>, SimError> {
    config.validate()?;
    info!(
        "running {} simulations: {} honest / {} fixed / {} liveness / {} offline, {} colors, {} ({}), {}",
        config.runs,
        config.layout.honest,
        config.layout.fixed,
        config.layout.liveness,
        config.layout.offline,
        config.colors,
        config.algorithm,
        config.mode,
        config.params
    );

    let mut results = Vec::with_capacity(config.runs);
    for run in 0..config.runs {
        let network = run_once(config, run_seed(config.seed, run))?;
        let stats = network.stats();
        if stats.disagreement {
            warn!("run {}: honest participants finalized on different values", run);
        }
        info!(
            "run {}: {} rounds, full finality {:?}",
            run, stats.rounds, stats.rounds_to_full
        );
        results.push(stats);
    }
    Ok(results)
}

/// Rounds each algorithm needed in one seeded run; `None` when the cap hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub run: usize,
    pub seed: u64,
    pub tree_rounds: Option<u64>,
    pub flat_rounds: Option<u64>,
}

/// Runs a trie network and a flat network from the same seed, side by side,
/// until both reach `config.finality`. Fails if either one finalizes on
/// conflicting values.
pub fn compare(config: &SimConfig) -> Result<Vec<Comparison>, SimError> {
    config.validate()?;

    let mut comparisons = Vec::with_capacity(config.runs);
    for run in 0..config.runs {
        let seed = run_seed(config.seed, run);
        let mut sides = Vec::with_capacity(2);
        for algorithm in [Algorithm::Tree, Algorithm::Flat] {
            let side = SimConfig {
                algorithm,
                ..config.clone()
            };
            let mut rng = StdRng::seed_from_u64(seed);
            let network = Network::new(&side, &mut rng)?;
            sides.push((network, rng));
        }

        loop {
            let mut progressed = false;
            for (network, rng) in sides.iter_mut() {
                if !network.reached(config.finality) && network.rounds() < config.max_rounds {
                    network.round(rng);
                    progressed = true;
                }
                if network.disagreement() {
                    return Err(SimError::Disagreement {
                        run,
                        algorithm: network.algorithm(),
                    });
                }
            }
            if !progressed {
                break;
            }
        }

        let finished =
            |network: &Network| network.reached(config.finality).then(|| network.rounds());
        let comparison = Comparison {
            run,
            seed,
            tree_rounds: finished(&sides[0].0),
            flat_rounds: finished(&sides[1].0),
        };
        info!(
            "run {}: tree {:?} rounds, flat {:?} rounds",
            run, comparison.tree_rounds, comparison.flat_rounds
        );
        comparisons.push(comparison);
    }
    Ok(comparisons)
}

/// Parameter sets swept when none are given: K = 10 and K = 20 with a
/// growing quorum.
pub fn default_sweep() -> Vec<Parameters> {
    [(10, 6), (10, 7), (10, 8), (20, 11), (20, 12), (20, 13), (20, 14), (20, 15)]
        .into_iter()
        .map(|(k, alpha)| Parameters::new(k, alpha, 10, 13))
        .collect()
}

/// Outcome of one parameter set in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepEntry {
    pub params: Parameters,
    /// Rounds to finality of every run, in run order; `None` when capped.
    pub rounds: Vec<Option<u64>>,
    pub summary: Summary,
}

/// Runs `config` once per parameter set. Run `i` uses the same seed under
/// every set, so the sets are compared on identical networks.
pub fn sweep(config: &SimConfig, params: &[Parameters]) -> Result<Vec<SweepEntry>, SimError> {
    // Catch a bad set before any of the runs start.
    let configs: Vec<SimConfig> = params
        .iter()
        .map(|params| SimConfig {
            params: *params,
            ..config.clone()
        })
        .collect();
    for config in &configs {
        config.validate()?;
    }

    let mut entries = Vec::with_capacity(configs.len());
    for config in &configs {
        let results = run_simulation(config)?;
        let rounds = results
            .iter()
            .map(|stats| match config.finality {
                Finality::Full => stats.rounds_to_full,
                Finality::Partial => stats.rounds_to_partial,
            })
            .collect();
        let summary = summarize(&results);
        info!("sweep {}: {:?} average rounds to full finality", config.params, summary.avg_rounds_to_full);
        entries.push(SweepEntry {
            params: config.params,
            rounds,
            summary,
        });
    }
    Ok(entries)
}
