use dyad_models::belief::{BeliefRecord, PredictionRecord};
use dyad_models::conversation::Role;

/// One agent's private trajectory: beliefs, predictions, and the last
/// message it sent. Owned exclusively by that agent's side of the run; no
/// turn may touch the other agent's state.
///
/// The per-role turn counter, not positional indexing into the shared
/// conversation, is what answers "what did I believe at my previous turn",
/// so the turn-N input can only ever come from the same agent's turn N-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentState {
    role: Role,
    beliefs: Vec<BeliefRecord>,
    predictions: Vec<PredictionRecord>,
    last_message: Option<String>,
    turns_taken: u32,
}

impl AgentState {
    /// State as of completed belief formation.
    pub fn new(role: Role, initial_belief: u8) -> Self {
        Self {
            role,
            beliefs: vec![BeliefRecord::initial(initial_belief)],
            predictions: Vec::new(),
            last_message: None,
            turns_taken: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Record one completed turn by this agent. `prediction` is absent
    /// only for the initiator's formation-derived opening turn.
    pub fn record_turn(
        &mut self,
        belief: BeliefRecord,
        prediction: Option<PredictionRecord>,
        message: impl Into<String>,
    ) {
        self.beliefs.push(belief);
        if let Some(prediction) = prediction {
            self.predictions.push(prediction);
        }
        self.last_message = Some(message.into());
        self.turns_taken += 1;
    }

    /// The agent's latest belief. Defined from formation onward.
    pub fn latest_belief(&self) -> BeliefRecord {
        // beliefs is non-empty by construction
        self.beliefs[self.beliefs.len() - 1]
    }

    /// The agent's latest prediction of the counterpart, or `None` until
    /// its first exchange turn completes. Absence is not "0%".
    pub fn latest_prediction(&self) -> Option<PredictionRecord> {
        self.predictions.last().copied()
    }

    pub fn initial_belief(&self) -> u8 {
        self.beliefs[0].value
    }

    pub fn belief_trajectory(&self) -> &[BeliefRecord] {
        &self.beliefs
    }

    pub fn prediction_trajectory(&self) -> &[PredictionRecord] {
        &self.predictions
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }
}
