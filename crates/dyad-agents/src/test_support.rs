//! Test support: a deterministic, scripted [`ReasoningOracle`].
//!
//! Beyond returning canned responses, the scripted oracle records the
//! context of every call it receives, so tests can assert the belief and
//! prediction wiring (which values each turn actually saw) rather than
//! just the end state.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use dyad_models::belief::BeliefSource;
use dyad_models::conversation::{PerRole, Role};
use dyad_models::decision::Strategy;
use dyad_models::outcome::{BeliefOutcome, DecisionOutcome, ExchangeOutcome};
use dyad_models::task::TaskConfig;

use crate::error::AgentError;
use crate::oracle::{DecisionContext, ExchangeContext, ReasoningOracle};

/// What one exchange-turn call actually received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenExchange {
    pub role: Role,
    pub round: u32,
    pub own_belief: u8,
    pub own_belief_source: BeliefSource,
    pub own_prediction: Option<u8>,
    pub history_len: usize,
}

/// What one decision call actually received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenDecision {
    pub role: Role,
    pub own_initial_belief: u8,
    pub own_final_belief: u8,
    pub own_prediction: Option<u8>,
    pub partner_initial_belief: u8,
    pub conversation_len: usize,
}

/// A [`ReasoningOracle`] that replays a fixed script. Missing script
/// entries surface as transport errors, which also makes failure paths
/// easy to drive.
#[derive(Default)]
pub struct ScriptedOracle {
    beliefs: Mutex<PerRole<Option<BeliefOutcome>>>,
    replies: Mutex<PerRole<VecDeque<ExchangeOutcome>>>,
    decisions: Mutex<PerRole<Option<DecisionOutcome>>>,
    seen_exchanges: Mutex<Vec<SeenExchange>>,
    seen_decisions: Mutex<Vec<SeenDecision>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the formation result for one role.
    pub fn belief(self, role: Role, value: u8, message: &str) -> Self {
        *self.beliefs.lock().unwrap().get_mut(role) = Some(BeliefOutcome {
            belief: value,
            message: message.to_string(),
        });
        self
    }

    /// Queue the next exchange reply for one role. Replies are consumed in
    /// the order they were scripted.
    pub fn reply(self, role: Role, message: &str, updated_belief: u8, predicted: u8) -> Self {
        self.replies
            .lock()
            .unwrap()
            .get_mut(role)
            .push_back(ExchangeOutcome {
                message: message.to_string(),
                updated_belief,
                predicted_partner_belief: predicted,
            });
        self
    }

    /// Script the final decision for one role.
    pub fn decision(self, role: Role, choice: &str, strategy: Strategy, reasoning: &str) -> Self {
        *self.decisions.lock().unwrap().get_mut(role) = Some(DecisionOutcome {
            choice: choice.to_string(),
            strategy,
            reasoning: reasoning.to_string(),
        });
        self
    }

    /// Every exchange context received so far, in call order.
    pub fn seen_exchanges(&self) -> Vec<SeenExchange> {
        self.seen_exchanges.lock().unwrap().clone()
    }

    /// Every decision context received so far, in call order.
    pub fn seen_decisions(&self) -> Vec<SeenDecision> {
        self.seen_decisions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningOracle for ScriptedOracle {
    async fn form_belief(
        &self,
        _task: &TaskConfig,
        role: Role,
    ) -> Result<BeliefOutcome, AgentError> {
        self.beliefs
            .lock()
            .unwrap()
            .get(role)
            .clone()
            .ok_or_else(|| AgentError::Transport(format!("no scripted belief for {role}")))
    }

    async fn exchange_turn(
        &self,
        ctx: &ExchangeContext<'_>,
    ) -> Result<ExchangeOutcome, AgentError> {
        self.seen_exchanges.lock().unwrap().push(SeenExchange {
            role: ctx.role,
            round: ctx.round,
            own_belief: ctx.own_belief.value,
            own_belief_source: ctx.own_belief.source,
            own_prediction: ctx.own_prediction.map(|p| p.value),
            history_len: ctx.history.len(),
        });
        self.replies
            .lock()
            .unwrap()
            .get_mut(ctx.role)
            .pop_front()
            .ok_or_else(|| {
                AgentError::Transport(format!(
                    "no scripted reply for {} round {}",
                    ctx.role, ctx.round
                ))
            })
    }

    async fn decide(&self, ctx: &DecisionContext<'_>) -> Result<DecisionOutcome, AgentError> {
        self.seen_decisions.lock().unwrap().push(SeenDecision {
            role: ctx.role,
            own_initial_belief: ctx.own_initial_belief,
            own_final_belief: ctx.own_final_belief,
            own_prediction: ctx.own_prediction.map(|p| p.value),
            partner_initial_belief: ctx.partner_initial_belief,
            conversation_len: ctx.conversation.len(),
        });
        self.decisions
            .lock()
            .unwrap()
            .get(ctx.role)
            .clone()
            .ok_or_else(|| AgentError::Transport(format!("no scripted decision for {}", ctx.role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn scripted_belief_and_missing_script() {
        let oracle = ScriptedOracle::new().belief(Role::Initiator, 95, "hello");
        let task = TaskConfig::standard(1, dec!(0.66));

        let formed = oracle.form_belief(&task, Role::Initiator).await.unwrap();
        assert_eq!(formed.belief, 95);

        let err = oracle.form_belief(&task, Role::Responder).await.unwrap_err();
        assert!(matches!(err, AgentError::Transport(_)));
    }

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let oracle = ScriptedOracle::new()
            .reply(Role::Responder, "first", 42, 65)
            .reply(Role::Responder, "second", 68, 72);
        let task = TaskConfig::standard(1, dec!(0.66));
        let history = dyad_models::conversation::Conversation::new();

        for (round, expected) in [(1u32, 42u8), (2, 68)] {
            let ctx = ExchangeContext {
                task: &task,
                role: Role::Responder,
                round,
                history: &history,
                own_belief: dyad_models::belief::BeliefRecord::initial(25),
                own_prediction: None,
            };
            let outcome = oracle.exchange_turn(&ctx).await.unwrap();
            assert_eq!(outcome.updated_belief, expected);
        }
        assert_eq!(oracle.seen_exchanges().len(), 2);
    }
}
