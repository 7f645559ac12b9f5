//! frostbyte-consensus
//!
//! Snowball decisions over 256-bit candidate ids: the prefix trie
//! ([`DecisionTree`]) and the flat baseline ([`Flat`]) it is measured
//! against.

pub mod consensus;
pub mod errors;
pub mod flat;
pub mod snowball;
pub mod tree;

pub use consensus::{Algorithm, Consensus, Insertion};
pub use errors::ConsensusError;
pub use flat::Flat;
pub use snowball::{ConfidenceCounter, PreferenceCounter, RoundKind, RoundOutcome};
pub use tree::{DecisionTree, NodeKind, NodePath, NodeSnapshot, PathStep, TreeSnapshot};
