//! frostbyte-common
//!
//! Types shared by every crate of the workspace: the 256-bit candidate
//! identifiers, the vote bag exchanged once per round, and the Snowball
//! parameters with their validation rules.

pub mod ids;
pub mod params;

pub use ids::{Bag, Bit, DecisionId, IdError, ID_LEN, NUM_BITS};
pub use params::{Parameters, ParametersError};
