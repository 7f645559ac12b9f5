//! network.rs
//!
//! A simulated network of participants driven round by round. All
//! randomness (candidate colors, initial preferences, peer samples, the
//! participant picked in random-sampling mode) is drawn from the rng the
//! caller passes in, so a seed fully determines a run.

use std::collections::BTreeMap;

use frostbyte_common::{Bag, DecisionId, Parameters};
use frostbyte_consensus::Algorithm;
use rand::{rngs::StdRng, seq::SliceRandom, Rng};
use tracing::{debug, trace};

use crate::config::{Finality, Mode, SimConfig};
use crate::errors::SimError;
use crate::metrics::RunStats;
use crate::participant::{Minority, Participant};
use crate::sampler::Sampler;

pub struct Network {
    params: Parameters,
    mode: Mode,
    algorithm: Algorithm,
    colors: Vec<DecisionId>,
    participants: Vec<Participant>,
    sampler: Sampler,
    round: u64,
    finalized_at: BTreeMap<usize, u64>,
    partial_at: Option<u64>,
    full_at: Option<u64>,
}

impl Network {
    /// Builds the participants described by `config`.
    ///
    /// Honest participants come first, then fixed ones, then liveness
    /// attackers, then offline ones. Each honest participant starts from a
    /// random color and adds every other color; fixed participants are
    /// spread over the colors in order.
    pub fn new(config: &SimConfig, rng: &mut StdRng) -> Result<Self, SimError> {
        config.validate()?;

        let colors: Vec<DecisionId> = (0..config.colors)
            .map(|_| DecisionId::random(rng))
            .collect();

        let mut participants = Vec::with_capacity(config.layout.total());
        for _ in 0..config.layout.honest {
            let initial = colors[rng.gen_range(0..colors.len())];
            let mut instance = config.algorithm.build(config.params, initial)?;
            for color in &colors {
                instance.add(*color);
            }
            participants.push(Participant::Honest(instance));
        }
        for i in 0..config.layout.fixed {
            participants.push(Participant::Fixed(colors[i % colors.len()]));
        }
        for _ in 0..config.layout.liveness {
            participants.push(Participant::Liveness(Minority::new(colors.clone())));
        }
        for _ in 0..config.layout.offline {
            participants.push(Participant::Offline);
        }

        debug!(
            "network of {} participants ({} honest) over {} colors, {} / {}",
            participants.len(),
            config.layout.honest,
            colors.len(),
            config.algorithm,
            config.mode
        );

        Ok(Self {
            params: config.params,
            mode: config.mode,
            algorithm: config.algorithm,
            sampler: Sampler::new(participants.len()),
            colors,
            participants,
            round: 0,
            finalized_at: BTreeMap::new(),
            partial_at: None,
            full_at: None,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn colors(&self) -> &[DecisionId] {
        &self.colors
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Rounds run so far.
    pub fn rounds(&self) -> u64 {
        self.round
    }

    fn honest(&self) -> impl Iterator<Item = (usize, &Participant)> + '_ {
        self.participants
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_honest())
    }

    fn pending(&self) -> Vec<usize> {
        self.honest()
            .filter(|(_, p)| !p.finalized())
            .map(|(i, _)| i)
            .collect()
    }

    /// Samples `k` peers for `querier` and tallies their answers.
    fn poll<R: Rng + ?Sized>(&self, rng: &mut R, querier: usize) -> Bag {
        self.sampler
            .sample(rng, querier, self.params.k as usize)
            .into_iter()
            .filter_map(|peer| self.participants[peer].respond())
            .collect()
    }

    /// Runs one round. Nothing happens once every honest participant has
    /// finalized.
    pub fn round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let pending = self.pending();
        if pending.is_empty() {
            return;
        }
        self.inform_attackers();

        let polls: Vec<(usize, Bag)> = match self.mode {
            Mode::Lockstep => pending
                .iter()
                .map(|&querier| (querier, self.poll(rng, querier)))
                .collect(),
            Mode::RandomSampling => match pending.choose(rng) {
                Some(&querier) => vec![(querier, self.poll(rng, querier))],
                None => Vec::new(),
            },
        };

        for (querier, votes) in &polls {
            trace!("round {} participant {} polled {}", self.round, querier, votes);
            self.participants[*querier].record_poll(votes);
        }

        self.round += 1;
        self.update_finalization();
    }

    fn inform_attackers(&mut self) {
        if !self.participants.iter().any(|p| matches!(p, Participant::Liveness(_))) {
            return;
        }
        let distribution = self.distribution();
        for participant in &mut self.participants {
            participant.observe(&distribution);
        }
    }

    fn update_finalization(&mut self) {
        let round = self.round;
        let newly: Vec<usize> = self
            .honest()
            .filter(|(i, p)| p.finalized() && !self.finalized_at.contains_key(i))
            .map(|(i, _)| i)
            .collect();
        for i in newly {
            self.finalized_at.insert(i, round);
        }

        if self.partial_at.is_none() && self.partially_finalized() {
            self.partial_at = Some(round);
        }
        if self.full_at.is_none() && self.finalized() {
            self.full_at = Some(round);
            debug!("{} network finalized after {} rounds", self.algorithm, round);
        }
    }

    /// Whether every honest participant has finalized.
    pub fn finalized(&self) -> bool {
        self.honest().all(|(_, p)| p.finalized())
    }

    /// Whether more than half of the honest participants have finalized.
    pub fn partially_finalized(&self) -> bool {
        let (total, done) = self.honest().fold((0, 0), |(total, done), (_, p)| {
            (total + 1, done + usize::from(p.finalized()))
        });
        done > total / 2
    }

    /// Whether the run is done under `finality`.
    pub fn reached(&self, finality: Finality) -> bool {
        match finality {
            Finality::Full => self.finalized(),
            Finality::Partial => self.partially_finalized(),
        }
    }

    /// Whether all honest participants currently prefer the same candidate.
    pub fn agreement(&self) -> bool {
        let mut preferences = self.honest().filter_map(|(_, p)| p.respond());
        match preferences.next() {
            Some(first) => preferences.all(|pref| pref == first),
            None => true,
        }
    }

    /// Whether two honest participants finalized on different candidates.
    pub fn disagreement(&self) -> bool {
        let mut finalized = self
            .honest()
            .filter(|(_, p)| p.finalized())
            .filter_map(|(_, p)| p.respond());
        match finalized.next() {
            Some(first) => finalized.any(|pref| pref != first),
            None => false,
        }
    }

    /// Current preference of every honest participant, counted by candidate.
    pub fn distribution(&self) -> BTreeMap<DecisionId, usize> {
        let mut distribution = BTreeMap::new();
        for (_, p) in self.honest() {
            if let Some(pref) = p.respond() {
                *distribution.entry(pref).or_default() += 1;
            }
        }
        distribution
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            rounds: self.round,
            rounds_to_partial: self.partial_at,
            rounds_to_full: self.full_at,
            per_node_rounds: self.finalized_at.clone(),
            distribution: self.distribution(),
            agreement: self.agreement(),
            disagreement: self.disagreement(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use rand::SeedableRng;

    fn small_config(mode: Mode, algorithm: Algorithm) -> SimConfig {
        SimConfig {
            params: Parameters::new(5, 4, 8, 10),
            layout: Layout {
                honest: 12,
                fixed: 0,
                liveness: 0,
                offline: 0,
            },
            colors: 2,
            runs: 1,
            seed: 0,
            max_rounds: 500,
            algorithm,
            mode,
            finality: Finality::Full,
        }
    }

    #[test]
    fn test_layout_order() {
        let config = SimConfig {
            layout: Layout {
                honest: 6,
                fixed: 3,
                liveness: 1,
                offline: 2,
            },
            params: Parameters::new(4, 3, 2, 3),
            ..SimConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let network = Network::new(&config, &mut rng).unwrap();

        let kinds: Vec<bool> = network.participants().iter().map(|p| p.is_honest()).collect();
        assert_eq!(kinds.iter().filter(|h| **h).count(), 6);
        assert!(kinds[..6].iter().all(|h| *h));
        assert!(matches!(network.participants()[8], Participant::Fixed(c) if c == network.colors()[0]));
        assert!(matches!(network.participants()[9], Participant::Liveness(_)));
        assert!(matches!(network.participants()[11], Participant::Offline));
    }

    #[test]
    fn test_lockstep_network_finalizes_in_agreement() {
        let config = small_config(Mode::Lockstep, Algorithm::Tree);
        let mut rng = StdRng::seed_from_u64(42);
        let mut network = Network::new(&config, &mut rng).unwrap();

        while !network.finalized() && network.rounds() < config.max_rounds {
            network.round(&mut rng);
            assert!(!network.disagreement());
        }

        assert!(network.finalized());
        assert!(network.agreement());
        let stats = network.stats();
        assert_eq!(stats.rounds_to_full, Some(network.rounds()));
        assert_eq!(stats.per_node_rounds.len(), 12);
        assert!(stats.rounds_to_partial.unwrap() <= network.rounds());
        assert_eq!(stats.distribution.values().sum::<usize>(), 12);
    }

    #[test]
    fn test_random_sampling_polls_one_participant_per_round() {
        let config = small_config(Mode::RandomSampling, Algorithm::Flat);
        let mut rng = StdRng::seed_from_u64(7);
        let mut network = Network::new(&config, &mut rng).unwrap();

        network.round(&mut rng);
        assert_eq!(network.rounds(), 1);
        assert!(!network.finalized());
    }

    #[test]
    fn test_liveness_attacker_sees_the_distribution() {
        let mut config = small_config(Mode::Lockstep, Algorithm::Tree);
        config.layout.liveness = 1;
        let mut rng = StdRng::seed_from_u64(5);
        let mut network = Network::new(&config, &mut rng).unwrap();

        for _ in 0..3 {
            network.inform_attackers();
            let mut expected = Minority::new(network.colors().to_vec());
            expected.update(network.distribution());
            assert_eq!(network.participants()[12].respond(), expected.answer());
            network.round(&mut rng);
        }
    }

    #[test]
    fn test_partial_finality_comes_first() {
        let config = small_config(Mode::Lockstep, Algorithm::Flat);
        let mut rng = StdRng::seed_from_u64(11);
        let mut network = Network::new(&config, &mut rng).unwrap();

        while !network.reached(Finality::Partial) && network.rounds() < config.max_rounds {
            network.round(&mut rng);
        }
        assert!(network.reached(Finality::Partial));
        assert_eq!(network.stats().rounds_to_partial, Some(network.rounds()));
    }

    #[test]
    fn test_finalized_network_stops_counting_rounds() {
        let mut config = small_config(Mode::Lockstep, Algorithm::Flat);
        config.colors = 1;
        config.params = Parameters::new(5, 4, 1, 1);
        let mut rng = StdRng::seed_from_u64(3);
        let mut network = Network::new(&config, &mut rng).unwrap();

        network.round(&mut rng);
        assert!(network.finalized());
        network.round(&mut rng);
        assert_eq!(network.rounds(), 1);
        assert_eq!(network.stats().rounds_to_full, Some(1));
    }
}
