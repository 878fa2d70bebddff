use std::fmt;

use serde::{Deserialize, Serialize};

use crate::belief::{BeliefRecord, PredictionRecord};

/// The two negotiation roles. The initiator (Agent 1) opens every round;
/// the responder (Agent 2) always replies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Initiator,
    Responder,
}

impl Role {
    pub fn counterpart(self) -> Role {
        match self {
            Role::Initiator => Role::Responder,
            Role::Responder => Role::Initiator,
        }
    }

    /// Label used in logs and result records.
    pub fn label(self) -> &'static str {
        match self {
            Role::Initiator => "Agent 1",
            Role::Responder => "Agent 2",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pair of values indexed by [`Role`]. Used for the per-role task
/// configurations, agent states, and decisions, keeping the two sides'
/// data exclusively owned and impossible to cross-assign by accident.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerRole<T> {
    pub initiator: T,
    pub responder: T,
}

impl<T> PerRole<T> {
    pub fn new(initiator: T, responder: T) -> Self {
        Self {
            initiator,
            responder,
        }
    }

    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::Initiator => &self.initiator,
            Role::Responder => &self.responder,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::Initiator => &mut self.initiator,
            Role::Responder => &mut self.responder,
        }
    }
}

impl<T: Clone> PerRole<T> {
    /// Both roles share one value; the symmetric-experiment case.
    pub fn uniform(value: T) -> Self {
        Self {
            initiator: value.clone(),
            responder: value,
        }
    }
}

/// One completed turn: the message placed on the shared channel plus the
/// speaker's private state after speaking. Immutable once appended.
///
/// `prediction_after` is `None` only for the initiator's opening turn,
/// which is derived from belief formation rather than an exchange call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub round: u32,
    pub speaker: Role,
    pub message: String,
    pub belief_after: BeliefRecord,
    pub prediction_after: Option<PredictionRecord>,
}

/// The ordered, append-only message log shared by both agents.
///
/// Only the active turn appends; both roles read. The internal vector is
/// private so no caller can reorder or rewrite history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
