//! snowball
//!
//! Counters shared by every consensus instance: the consecutive-success
//! confidence counter and the preference tracker built on top of it.

mod confidence;
mod preference;

pub use confidence::ConfidenceCounter;
pub use preference::{PreferenceCounter, RoundKind, RoundOutcome};
