use frostbyte_common::ParametersError;
use frostbyte_consensus::{Algorithm, ConsensusError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Consensus error: {0}")]
    Consensus(#[from] ConsensusError),

    #[error("Invalid parameters: {0}")]
    Parameters(#[from] ParametersError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The participant layout cannot support the configured sample size.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// A scripted visualization that cannot be played.
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    /// Two honest participants finalized on different candidates.
    #[error("Run {run}: {algorithm} network finalized on conflicting values")]
    Disagreement { run: usize, algorithm: Algorithm },
}
