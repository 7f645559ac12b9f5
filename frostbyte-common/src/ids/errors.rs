use thiserror::Error;

/// Errors raised while parsing a [`DecisionId`](super::DecisionId).
#[derive(Debug, Error)]
pub enum IdError {
    /// The hex form was not exactly 64 hex digits.
    #[error("Invalid hex identifier: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A bit string contained something other than `0` or `1`.
    #[error("Invalid bit {found:?} at position {position}")]
    InvalidBit { position: usize, found: char },

    /// A bit string longer than an identifier.
    #[error("Bit string has {0} bits, identifiers hold 256")]
    TooManyBits(usize),
}
