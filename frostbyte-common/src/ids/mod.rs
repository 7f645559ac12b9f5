//! ids
//!
//! Candidate identifiers and the per-round vote bag built on top of them.

mod bag;
mod decision_id;
mod errors;

pub use bag::Bag;
pub use decision_id::{Bit, DecisionId, ID_LEN, NUM_BITS};
pub use errors::IdError;
