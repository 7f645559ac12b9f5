use thiserror::Error;

/// Ways a set of Snowball [`Parameters`](super::Parameters) can be unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParametersError {
    /// A poll must sample at least one peer.
    #[error("K = {0}: the sample size must be at least 1")]
    ZeroSampleSize(u64),

    #[error("Alpha = {0}: the quorum must be at least 1")]
    AlphaTooSmall(u64),

    /// The quorum can never be met by a sample of size `k`.
    #[error("Alpha = {alpha} exceeds K = {k}")]
    AlphaExceedsK { alpha: u64, k: u64 },

    #[error("BetaVirtuous = {0}: must be at least 1")]
    BetaVirtuousTooSmall(u32),

    #[error("BetaRogue = {0}: must be at least 1")]
    BetaRogueTooSmall(u32),
}
