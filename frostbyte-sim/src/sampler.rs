use rand::{seq::index, Rng};

/// Uniform peer sampling without replacement.
///
/// The querying participant never samples itself. Randomness comes only from
/// the rng handed in by the caller.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    population: usize,
}

impl Sampler {
    pub fn new(population: usize) -> Self {
        Self { population }
    }

    pub fn population(&self) -> usize {
        self.population
    }

    /// Largest sample a single participant can draw.
    pub fn max_sample(&self) -> usize {
        self.population.saturating_sub(1)
    }

    /// Draws `k` distinct participant indices other than `querier`. Asking
    /// for more peers than exist returns every other participant.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, querier: usize, k: usize) -> Vec<usize> {
        let others = self.max_sample();
        index::sample(rng, others, k.min(others))
            .into_iter()
            .map(|i| if i >= querier { i + 1 } else { i })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::BTreeSet;

    #[test]
    fn test_sample_excludes_querier_and_is_distinct() {
        let sampler = Sampler::new(10);
        let mut rng = StdRng::seed_from_u64(1);

        for querier in 0..10 {
            let peers = sampler.sample(&mut rng, querier, 5);
            let unique: BTreeSet<usize> = peers.iter().copied().collect();
            assert_eq!(peers.len(), 5);
            assert_eq!(unique.len(), 5);
            assert!(!unique.contains(&querier));
            assert!(peers.iter().all(|&p| p < 10));
        }
    }

    #[test]
    fn test_sample_everyone_else() {
        let sampler = Sampler::new(4);
        let mut rng = StdRng::seed_from_u64(2);
        let peers: BTreeSet<usize> = sampler.sample(&mut rng, 2, 8).into_iter().collect();
        assert_eq!(peers, BTreeSet::from([0, 1, 3]));
    }

    #[test]
    fn test_same_seed_same_sample() {
        let sampler = Sampler::new(50);
        let a = sampler.sample(&mut StdRng::seed_from_u64(9), 0, 20);
        let b = sampler.sample(&mut StdRng::seed_from_u64(9), 0, 20);
        assert_eq!(a, b);
    }
}
