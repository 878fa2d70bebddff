use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::{PerRole, Role};

/// The oracle-declared stance behind a choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Collaborative,
    Individual,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Collaborative => "collaborative",
            Strategy::Individual => "individual",
        })
    }
}

/// One agent's final, terminal choice for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub agent: Role,
    /// One of the option ids from that agent's payoff table.
    pub choice: String,
    pub strategy: Strategy,
    pub reasoning: String,
}

/// The single persisted record of a completed run.
///
/// Created once, after both decisions exist; nothing is recorded for
/// failed or cancelled runs. `mismatch` is derived from the two declared
/// strategies in the constructor and nowhere else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    pub run_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub task_id: u32,
    pub thresholds: PerRole<Decimal>,
    pub initial_beliefs: PerRole<u8>,
    pub decisions: PerRole<Decision>,
    pub mismatch: bool,
}

impl ResultRecord {
    pub fn new(
        run_id: Uuid,
        completed_at: DateTime<Utc>,
        task_id: u32,
        thresholds: PerRole<Decimal>,
        initial_beliefs: PerRole<u8>,
        decisions: PerRole<Decision>,
    ) -> Self {
        let mismatch = decisions.initiator.strategy != decisions.responder.strategy;
        Self {
            run_id,
            completed_at,
            task_id,
            thresholds,
            initial_beliefs,
            decisions,
            mismatch,
        }
    }
}
