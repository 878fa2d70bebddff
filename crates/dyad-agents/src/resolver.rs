use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use dyad_models::conversation::{PerRole, Role};
use dyad_models::decision::{Decision, ResultRecord, Strategy};
use dyad_models::outcome::DecisionOutcome;
use dyad_models::task::TaskConfig;

use crate::error::{AgentError, Phase};
use crate::oracle::{DecisionContext, ReasoningOracle};
use crate::orchestrator::NegotiationOutcome;

/// Turns a completed negotiation into two validated decisions.
///
/// The resolver does not choose; the oracle does. Its jobs are assembling
/// each role's decision context deterministically, validating what comes
/// back, and keeping the two sides sealed off from each other: the only
/// cross-agent value ever disclosed is the partner's initial belief.
pub struct DecisionResolver {
    oracle: Arc<dyn ReasoningOracle>,
    tasks: PerRole<TaskConfig>,
}

impl DecisionResolver {
    pub fn new(
        oracle: Arc<dyn ReasoningOracle>,
        tasks: PerRole<TaskConfig>,
    ) -> Result<Self, AgentError> {
        tasks.initiator.validate()?;
        tasks.responder.validate()?;
        Ok(Self { oracle, tasks })
    }

    /// Ask each role for its final decision, initiator first.
    pub async fn resolve(
        &self,
        outcome: &NegotiationOutcome,
    ) -> Result<PerRole<Decision>, AgentError> {
        let initiator = self.decide_for(Role::Initiator, outcome).await?;
        let responder = self.decide_for(Role::Responder, outcome).await?;
        Ok(PerRole::new(initiator, responder))
    }

    async fn decide_for(
        &self,
        role: Role,
        outcome: &NegotiationOutcome,
    ) -> Result<Decision, AgentError> {
        let own = outcome.states.get(role);
        let partner = outcome.states.get(role.counterpart());
        let task = self.tasks.get(role);
        let ctx = DecisionContext {
            task,
            role,
            own_initial_belief: own.initial_belief(),
            own_final_belief: own.latest_belief().value,
            own_prediction: own.latest_prediction(),
            partner_initial_belief: partner.initial_belief(),
            conversation: &outcome.conversation,
        };
        let declared = self.oracle.decide(&ctx).await?;
        validate_declaration(role, task, &declared)?;
        info!(%role, choice = %declared.choice, strategy = %declared.strategy, "decision resolved");
        Ok(Decision {
            agent: role,
            choice: declared.choice,
            strategy: declared.strategy,
            reasoning: declared.reasoning,
        })
    }
}

/// The choice must name a configured option, and the declared strategy
/// must match whether that option is the individual one. Violations
/// surface as validation failures on that agent's decision; nothing is
/// auto-corrected.
fn validate_declaration(
    role: Role,
    task: &TaskConfig,
    declared: &DecisionOutcome,
) -> Result<(), AgentError> {
    if !task.options.contains_key(&declared.choice) {
        return Err(AgentError::OracleFormat {
            phase: Phase::Decision,
            role,
            detail: format!("choice `{}` is not a configured option", declared.choice),
            raw: format!("{declared:?}"),
        });
    }
    let is_individual = task.individual_option_id() == Some(declared.choice.as_str());
    let implied = if is_individual {
        Strategy::Individual
    } else {
        Strategy::Collaborative
    };
    if declared.strategy != implied {
        return Err(AgentError::Consistency {
            role,
            detail: format!(
                "choice `{}` implies {implied} but strategy `{}` was declared",
                declared.choice, declared.strategy
            ),
        });
    }
    Ok(())
}

/// Assemble the persisted record for a completed run. `mismatch` is
/// derived from the two declared strategies inside [`ResultRecord::new`];
/// beliefs and thresholds play no part in it.
pub fn build_result_record(
    tasks: &PerRole<TaskConfig>,
    outcome: &NegotiationOutcome,
    decisions: PerRole<Decision>,
    run_id: Uuid,
    completed_at: DateTime<Utc>,
) -> ResultRecord {
    ResultRecord::new(
        run_id,
        completed_at,
        tasks.initiator.task_id,
        PerRole::new(tasks.initiator.threshold, tasks.responder.threshold),
        PerRole::new(
            outcome.states.initiator.initial_belief(),
            outcome.states.responder.initial_belief(),
        ),
        decisions,
    )
}
