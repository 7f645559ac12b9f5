use std::fmt;

/// Consecutive-success counter with a sticky finality flag.
///
/// Any unsuccessful round drops the confidence back to zero; once the
/// confidence has reached the threshold of some round the counter stays
/// finalized for good.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfidenceCounter {
    confidence: u32,
    finalized: bool,
}

impl ConfidenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more successful round and finalizes once `threshold`
    /// consecutive successes have been seen.
    pub fn record_success(&mut self, threshold: u32) {
        self.confidence = self.confidence.saturating_add(1);
        if self.confidence >= threshold {
            self.finalized = true;
        }
    }

    /// Resets the streak. Finality, if already reached, is kept.
    pub fn record_failure(&mut self) {
        self.confidence = 0;
    }

    pub fn confidence(&self) -> u32 {
        self.confidence
    }

    pub fn finalized(&self) -> bool {
        self.finalized
    }
}

impl fmt::Display for ConfidenceCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SF(Confidence = {}, Finalized = {})",
            self.confidence, self.finalized
        )
    }
}
