use std::fmt;

use dyad_models::conversation::Role;
use dyad_models::task::TaskError;
use thiserror::Error;

/// Protocol phase an error occurred in, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BeliefFormation,
    Exchange(u32),
    Decision,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::BeliefFormation => f.write_str("belief formation"),
            Phase::Exchange(round) => write!(f, "exchange round {round}"),
            Phase::Decision => f.write_str("decision"),
        }
    }
}

/// Errors from the negotiation engine. All variants are fatal for the
/// affected run; a batch driver catches them per run and moves on.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The oracle answered, but the answer is unusable: missing fields, a
    /// belief or prediction outside `[0, 100]`, or an unknown option id.
    /// Carries the raw response so the malfunction is diagnosable; it is
    /// never repaired into defaults.
    #[error("malformed oracle response during {phase} for {role}: {detail}; raw response: {raw}")]
    OracleFormat {
        phase: Phase,
        role: Role,
        detail: String,
        raw: String,
    },

    /// The oracle call itself failed (spawn, exit status, empty output).
    #[error("oracle transport failure: {0}")]
    Transport(String),

    #[error("oracle call timed out after {0} seconds")]
    Timeout(u64),

    #[error("invalid task configuration: {0}")]
    Config(#[from] TaskError),

    /// The declared strategy contradicts the chosen option.
    #[error("inconsistent decision from {role}: {detail}")]
    Consistency { role: Role, detail: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Transport-level failures may be retried; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::Transport(_) | AgentError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability() {
        assert!(AgentError::Transport("spawn failed".to_string()).is_retryable());
        assert!(AgentError::Timeout(45).is_retryable());
        assert!(!AgentError::OracleFormat {
            phase: Phase::Exchange(2),
            role: Role::Responder,
            detail: "updated_belief out of range".to_string(),
            raw: "{}".to_string(),
        }
        .is_retryable());
        assert!(!AgentError::Config(TaskError::NoExchanges).is_retryable());
    }

    #[test]
    fn format_error_names_phase_and_role() {
        let err = AgentError::OracleFormat {
            phase: Phase::Exchange(3),
            role: Role::Initiator,
            detail: "missing field `updated_belief`".to_string(),
            raw: "not json".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("exchange round 3"));
        assert!(text.contains("Agent 1"));
        assert!(text.contains("not json"));
    }
}
