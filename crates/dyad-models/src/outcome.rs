use serde::{Deserialize, Serialize};

use crate::decision::Strategy;

/// Result of a belief-formation oracle call: the agent's initial belief
/// plus the message it wants to open with. Only the initiator's message
/// ever reaches the shared channel; the responder's is discarded by the
/// protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BeliefOutcome {
    pub belief: u8,
    pub message: String,
}

/// Result of an exchange-turn oracle call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// The message placed on the shared channel this turn.
    pub message: String,
    /// The speaker's belief after reading the conversation so far.
    pub updated_belief: u8,
    /// The speaker's private estimate of the counterpart's belief.
    pub predicted_partner_belief: u8,
}

/// Result of a decision oracle call, prior to resolver validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub choice: String,
    pub strategy: Strategy,
    pub reasoning: String,
}
