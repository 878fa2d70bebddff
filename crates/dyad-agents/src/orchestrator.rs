use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use dyad_models::belief::{BeliefRecord, PredictionRecord};
use dyad_models::conversation::{Conversation, PerRole, Role, Turn};
use dyad_models::task::{TaskConfig, TaskError};

use crate::error::{AgentError, Phase};
use crate::oracle::{ExchangeContext, ReasoningOracle};
use crate::state::AgentState;

/// Everything a completed negotiation leaves behind: the shared message
/// log and both agents' private trajectories. Input to the resolver.
#[derive(Debug, Clone)]
pub struct NegotiationOutcome {
    pub conversation: Conversation,
    pub states: PerRole<AgentState>,
}

/// Drives the fixed turn sequence: belief formation for both roles, the
/// initiator's opening message, then alternating replies for
/// `exchange_count` rounds: `2 * exchange_count` turns in total.
///
/// Each turn's oracle inputs come exclusively from the speaker's own
/// [`AgentState`]: its own latest belief and its own latest prediction,
/// plus the conversation prefix. Turns are strictly sequential; a run
/// that fails or is cancelled leaves nothing persisted.
pub struct ExchangeOrchestrator {
    oracle: Arc<dyn ReasoningOracle>,
    tasks: PerRole<TaskConfig>,
}

impl std::fmt::Debug for ExchangeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeOrchestrator")
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl ExchangeOrchestrator {
    /// Validates both task configurations up front; no oracle call is made
    /// for an invalid configuration.
    pub fn new(
        oracle: Arc<dyn ReasoningOracle>,
        tasks: PerRole<TaskConfig>,
    ) -> Result<Self, AgentError> {
        tasks.initiator.validate()?;
        tasks.responder.validate()?;
        if tasks.initiator.exchange_count != tasks.responder.exchange_count {
            return Err(TaskError::ExchangeCountMismatch(
                tasks.initiator.exchange_count,
                tasks.responder.exchange_count,
            )
            .into());
        }
        Ok(Self { oracle, tasks })
    }

    /// Both roles play the same task; the symmetric experiment.
    pub fn symmetric(
        oracle: Arc<dyn ReasoningOracle>,
        task: TaskConfig,
    ) -> Result<Self, AgentError> {
        Self::new(oracle, PerRole::uniform(task))
    }

    pub fn tasks(&self) -> &PerRole<TaskConfig> {
        &self.tasks
    }

    pub fn exchange_count(&self) -> u32 {
        self.tasks.initiator.exchange_count
    }

    /// Run the full exchange sequence.
    pub async fn run(&self) -> Result<NegotiationOutcome, AgentError> {
        let started = Instant::now();
        let exchanges = self.exchange_count();
        info!(
            task_id = self.tasks.initiator.task_id,
            exchanges, "starting negotiation"
        );

        // The two formation calls have no data dependency and run
        // concurrently; both must commit before any exchange turn.
        let (initiator_formed, responder_formed) = tokio::try_join!(
            self.oracle.form_belief(&self.tasks.initiator, Role::Initiator),
            self.oracle.form_belief(&self.tasks.responder, Role::Responder),
        )?;
        check_percent(
            initiator_formed.belief,
            Phase::BeliefFormation,
            Role::Initiator,
            "belief",
        )?;
        check_percent(
            responder_formed.belief,
            Phase::BeliefFormation,
            Role::Responder,
            "belief",
        )?;
        info!(
            initiator_belief = initiator_formed.belief,
            responder_belief = responder_formed.belief,
            "beliefs formed"
        );

        let mut states = PerRole::new(
            AgentState::new(Role::Initiator, initiator_formed.belief),
            AgentState::new(Role::Responder, responder_formed.belief),
        );
        let mut conversation = Conversation::new();

        // Round 1 opens with the initiator's formation message. The
        // responder also produced one, but it never reaches the channel.
        let opening_belief = BeliefRecord::from_exchange(initiator_formed.belief, 1);
        conversation.append(Turn {
            round: 1,
            speaker: Role::Initiator,
            message: initiator_formed.message.clone(),
            belief_after: opening_belief,
            prediction_after: None,
        });
        states
            .get_mut(Role::Initiator)
            .record_turn(opening_belief, None, initiator_formed.message);

        for round in 1..=exchanges {
            if round > 1 {
                self.take_turn(Role::Initiator, round, &mut conversation, &mut states)
                    .await?;
            }
            self.take_turn(Role::Responder, round, &mut conversation, &mut states)
                .await?;
        }

        info!(
            turns = conversation.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "negotiation complete"
        );
        Ok(NegotiationOutcome {
            conversation,
            states,
        })
    }

    /// One exchange turn: read the speaker's own latest state, call the
    /// oracle, validate, then commit exactly one turn to the conversation
    /// and one record pair to the speaker's state.
    async fn take_turn(
        &self,
        role: Role,
        round: u32,
        conversation: &mut Conversation,
        states: &mut PerRole<AgentState>,
    ) -> Result<(), AgentError> {
        let outcome = {
            let state = states.get(role);
            let ctx = ExchangeContext {
                task: self.tasks.get(role),
                role,
                round,
                history: conversation,
                own_belief: state.latest_belief(),
                own_prediction: state.latest_prediction(),
            };
            self.oracle.exchange_turn(&ctx).await?
        };

        let phase = Phase::Exchange(round);
        check_percent(outcome.updated_belief, phase, role, "updated_belief")?;
        check_percent(
            outcome.predicted_partner_belief,
            phase,
            role,
            "predicted_partner_belief",
        )?;
        debug!(%role, round, belief = outcome.updated_belief, "turn complete");

        let belief = BeliefRecord::from_exchange(outcome.updated_belief, round);
        let prediction = PredictionRecord {
            value: outcome.predicted_partner_belief,
            about_round: round,
        };
        conversation.append(Turn {
            round,
            speaker: role,
            message: outcome.message.clone(),
            belief_after: belief,
            prediction_after: Some(prediction),
        });
        states
            .get_mut(role)
            .record_turn(belief, Some(prediction), outcome.message);
        Ok(())
    }
}

/// Oracle-supplied percentages are validated, never clamped: a silent
/// clamp would hide oracle malfunction from the experiment log.
fn check_percent(value: u8, phase: Phase, role: Role, field: &str) -> Result<(), AgentError> {
    if value > 100 {
        return Err(AgentError::OracleFormat {
            phase,
            role,
            detail: format!("{field} value {value} is outside [0, 100]"),
            raw: format!("{field}={value}"),
        });
    }
    Ok(())
}
