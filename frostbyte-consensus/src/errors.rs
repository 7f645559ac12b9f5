use frostbyte_common::ParametersError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    /// The parameters failed validation when an instance was initialized.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] ParametersError),

    /// An algorithm name that is neither `tree` nor `flat`.
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}
