//! decision_id.rs
//!
//! Fixed-length candidate identifiers and the bit/prefix primitives used to
//! route votes through the decision trie.
//!
//! Bits are numbered from the most significant bit of the first byte, so bit 0
//! is the top bit of `bytes[0]` and bit 255 the lowest bit of `bytes[31]`.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::IdError;

/// Length of a [`DecisionId`] in bytes.
pub const ID_LEN: usize = 32;

/// Number of bits in a [`DecisionId`].
pub const NUM_BITS: usize = ID_LEN * 8;

/// One bit of a [`DecisionId`]; also names the two branches of a fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    /// Both bits, in branch order.
    pub const ALL: [Bit; 2] = [Bit::Zero, Bit::One];

    /// Position of this branch in a two-element array.
    pub fn index(self) -> usize {
        match self {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }
}

impl From<bool> for Bit {
    fn from(set: bool) -> Self {
        if set {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Opaque 256-bit candidate identifier.
///
/// Ordering is lexicographic over the bytes, which is the same as comparing
/// the bit strings from the most significant bit.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct DecisionId(#[serde(with = "hex::serde")] [u8; ID_LEN]);

impl DecisionId {
    /// The all-zero identifier.
    pub const EMPTY: DecisionId = DecisionId([0u8; ID_LEN]);

    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Builds an id whose leading bits are given as a string of `0`/`1`.
    /// Bits past the end of the string are zero.
    pub fn from_bit_string(bits: &str) -> Result<Self, IdError> {
        if bits.len() > NUM_BITS {
            return Err(IdError::TooManyBits(bits.len()));
        }

        let mut bytes = [0u8; ID_LEN];
        for (position, c) in bits.chars().enumerate() {
            match c {
                '0' => {}
                '1' => bytes[position / 8] |= 0x80 >> (position % 8),
                other => return Err(IdError::InvalidBit { position, found: other }),
            }
        }
        Ok(Self(bytes))
    }

    /// Draws an identifier from `rng`. Intended for tests and simulations,
    /// not for anything that needs unpredictable ids.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; ID_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_BITS`.
    pub fn bit(&self, index: usize) -> Bit {
        assert!(index < NUM_BITS, "bit index {index} out of range");
        Bit::from(self.0[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    /// Number of leading bits shared with `other`.
    pub fn common_prefix_len(&self, other: &DecisionId) -> usize {
        for (i, (a, b)) in self.0.iter().zip(other.0.iter()).enumerate() {
            let diff = a ^ b;
            if diff != 0 {
                return i * 8 + diff.leading_zeros() as usize;
            }
        }
        NUM_BITS
    }

    /// First bit index in `[start, end)` where `self` and `other` differ.
    pub fn first_difference(&self, other: &DecisionId, start: usize, end: usize) -> Option<usize> {
        let end = end.min(NUM_BITS);
        (start..end).find(|&i| self.bit(i) != other.bit(i))
    }

    /// Whether `self` and `other` agree on every bit in `[start, end)`.
    pub fn equal_range(&self, other: &DecisionId, start: usize, end: usize) -> bool {
        self.first_difference(other, start, end).is_none()
    }

    /// Renders the first `len` bits as a string of `0`/`1`.
    pub fn to_bit_string(&self, len: usize) -> String {
        (0..len.min(NUM_BITS))
            .map(|i| match self.bit(i) {
                Bit::Zero => '0',
                Bit::One => '1',
            })
            .collect()
    }

    /// Short hex prefix, handy in log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecisionId({})", self.short())
    }
}

impl FromStr for DecisionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ID_LEN]> for DecisionId {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for DecisionId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
