//! params
//!
//! Snowball parameters shared by every decision structure.

mod errors;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use errors::ParametersError;

/// Sampling and confidence parameters of a Snowball instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// Number of peers sampled per round.
    pub k: u64,
    /// Votes a branch needs in one round to count as a quorum winner.
    pub alpha: u64,
    /// Consecutive successes needed to finalize when no conflict was observed.
    pub beta_virtuous: u32,
    /// Consecutive successes needed to finalize once a conflict was observed.
    pub beta_rogue: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            k: 20,
            alpha: 15,
            beta_virtuous: 15,
            beta_rogue: 20,
        }
    }
}

impl Parameters {
    pub fn new(k: u64, alpha: u64, beta_virtuous: u32, beta_rogue: u32) -> Self {
        Self {
            k,
            alpha,
            beta_virtuous,
            beta_rogue,
        }
    }

    /// Checks the parameters before any decision structure is built.
    ///
    /// `beta_rogue < beta_virtuous` is accepted, but a conflict would then
    /// finalize faster than an uncontested decision, so it is logged.
    pub fn verify(&self) -> Result<(), ParametersError> {
        if self.k == 0 {
            return Err(ParametersError::ZeroSampleSize(self.k));
        }
        if self.alpha < 1 {
            return Err(ParametersError::AlphaTooSmall(self.alpha));
        }
        if self.alpha > self.k {
            return Err(ParametersError::AlphaExceedsK {
                alpha: self.alpha,
                k: self.k,
            });
        }
        if self.beta_virtuous < 1 {
            return Err(ParametersError::BetaVirtuousTooSmall(self.beta_virtuous));
        }
        if self.beta_rogue < 1 {
            return Err(ParametersError::BetaRogueTooSmall(self.beta_rogue));
        }
        if self.beta_rogue < self.beta_virtuous {
            warn!(
                "BetaRogue ({}) is below BetaVirtuous ({}); contested decisions will finalize first",
                self.beta_rogue, self.beta_virtuous
            );
        }
        Ok(())
    }

    /// Whether `alpha` is a strict majority of `k`, so that at most one
    /// branch can win any single round.
    pub fn is_majority(&self) -> bool {
        2 * self.alpha > self.k
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "K = {}, Alpha = {}, BetaVirtuous = {}, BetaRogue = {}",
            self.k, self.alpha, self.beta_virtuous, self.beta_rogue
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = Parameters::default();
        assert!(params.verify().is_ok());
        assert!(params.is_majority());
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(
            Parameters::new(0, 0, 1, 1).verify(),
            Err(ParametersError::ZeroSampleSize(0))
        );
        assert_eq!(
            Parameters::new(3, 0, 1, 1).verify(),
            Err(ParametersError::AlphaTooSmall(0))
        );
        assert_eq!(
            Parameters::new(3, 4, 1, 1).verify(),
            Err(ParametersError::AlphaExceedsK { alpha: 4, k: 3 })
        );
        assert_eq!(
            Parameters::new(3, 2, 0, 1).verify(),
            Err(ParametersError::BetaVirtuousTooSmall(0))
        );
        assert_eq!(
            Parameters::new(3, 2, 1, 0).verify(),
            Err(ParametersError::BetaRogueTooSmall(0))
        );
    }

    #[test]
    fn test_rogue_below_virtuous_is_accepted() {
        assert!(Parameters::new(3, 2, 5, 2).verify().is_ok());
    }

    #[test]
    fn test_serde_field_names() {
        let params = Parameters::new(1, 1, 1, 2);
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json["k"], 1);
        assert_eq!(json["beta_rogue"], 2);

        let back: Parameters = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }
}
