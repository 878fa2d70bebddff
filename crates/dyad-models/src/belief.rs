use serde::{Deserialize, Serialize};

/// Which turn produced a belief record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BeliefSource {
    /// The belief-formation phase, before any message is exchanged.
    Initial,
    /// The agent's turn in the given exchange round.
    Exchange(u32),
}

/// One point on an agent's private belief trajectory: its estimate, in
/// whole percent (`0..=100`), that mutual collaboration succeeds.
///
/// Trajectories only grow; values may move in either direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BeliefRecord {
    pub value: u8,
    pub source: BeliefSource,
}

impl BeliefRecord {
    pub fn initial(value: u8) -> Self {
        Self {
            value,
            source: BeliefSource::Initial,
        }
    }

    pub fn from_exchange(value: u8, round: u32) -> Self {
        Self {
            value,
            source: BeliefSource::Exchange(round),
        }
    }
}

/// An agent's private estimate of its counterpart's current belief, in
/// whole percent. Never disclosed to the counterpart; it only conditions
/// the owning agent's own subsequent oracle calls.
///
/// Predictions start absent, not at zero: until an agent has completed an
/// exchange turn there is no record at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionRecord {
    pub value: u8,
    /// The exchange round after which this prediction was formed.
    pub about_round: u32,
}
