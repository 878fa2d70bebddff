use std::time::Duration;

use async_trait::async_trait;

use dyad_models::belief::{BeliefRecord, PredictionRecord};
use dyad_models::config::OracleConfig;
use dyad_models::conversation::{Conversation, Role};
use dyad_models::outcome::{BeliefOutcome, DecisionOutcome, ExchangeOutcome};
use dyad_models::task::TaskConfig;

use crate::claude_cli::{invoke_with_retry, ClaudeCliConfig};
use crate::error::AgentError;
use crate::parser;
use crate::prompts;

/// Inputs for one exchange turn. The orchestrator assembles this strictly
/// from the speaker's own state; nothing of the counterpart's private
/// trajectory ever appears here.
#[derive(Debug, Clone)]
pub struct ExchangeContext<'a> {
    pub task: &'a TaskConfig,
    pub role: Role,
    pub round: u32,
    /// Conversation prefix up to, and not including, this turn.
    pub history: &'a Conversation,
    /// The speaker's own latest belief, recorded at its previous turn.
    pub own_belief: BeliefRecord,
    /// The speaker's own latest prediction of the counterpart. Absent on
    /// the speaker's first exchange turn.
    pub own_prediction: Option<PredictionRecord>,
}

/// Inputs for the final decision call. The counterpart's *initial* belief
/// is the only cross-agent value disclosed, and only at this stage.
#[derive(Debug, Clone)]
pub struct DecisionContext<'a> {
    pub task: &'a TaskConfig,
    pub role: Role,
    pub own_initial_belief: u8,
    pub own_final_belief: u8,
    pub own_prediction: Option<PredictionRecord>,
    pub partner_initial_belief: u8,
    pub conversation: &'a Conversation,
}

/// The reasoning engine behind both agents. The core never depends on how
/// messages or numbers are produced, only on this contract, which keeps
/// the whole pipeline testable with a deterministic stub.
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    /// Evaluate the payoff table and form an initial belief, plus an
    /// opening message.
    async fn form_belief(
        &self,
        task: &TaskConfig,
        role: Role,
    ) -> Result<BeliefOutcome, AgentError>;

    /// Produce the next message given the conversation so far, updating
    /// belief and prediction.
    async fn exchange_turn(
        &self,
        ctx: &ExchangeContext<'_>,
    ) -> Result<ExchangeOutcome, AgentError>;

    /// Choose a final option after all exchanges.
    async fn decide(&self, ctx: &DecisionContext<'_>) -> Result<DecisionOutcome, AgentError>;
}

/// [`ReasoningOracle`] backed by the `claude` CLI.
pub struct ClaudeOracle {
    cli: ClaudeCliConfig,
    context_prompt: String,
}

impl ClaudeOracle {
    pub fn new(cli: ClaudeCliConfig) -> Self {
        Self {
            cli,
            context_prompt: prompts::DEFAULT_CONTEXT_PROMPT.to_string(),
        }
    }

    /// Replace the scenario preamble shown to both agents.
    pub fn with_context_prompt(mut self, text: impl Into<String>) -> Self {
        self.context_prompt = text.into();
        self
    }

    pub fn from_config(config: &OracleConfig) -> Self {
        let oracle = Self::new(ClaudeCliConfig {
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            max_attempts: config.max_attempts,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        });
        match &config.context_prompt {
            Some(text) => oracle.with_context_prompt(text.clone()),
            None => oracle,
        }
    }
}

#[async_trait]
impl ReasoningOracle for ClaudeOracle {
    async fn form_belief(
        &self,
        task: &TaskConfig,
        role: Role,
    ) -> Result<BeliefOutcome, AgentError> {
        let prompt = prompts::belief_formation_prompt(task);
        let raw = invoke_with_retry(&self.context_prompt, &prompt, &self.cli).await?;
        parser::parse_belief(&raw, role)
    }

    async fn exchange_turn(
        &self,
        ctx: &ExchangeContext<'_>,
    ) -> Result<ExchangeOutcome, AgentError> {
        let prompt = prompts::exchange_prompt(ctx);
        let raw = invoke_with_retry(&self.context_prompt, &prompt, &self.cli).await?;
        parser::parse_exchange(&raw, ctx.role, ctx.round)
    }

    async fn decide(&self, ctx: &DecisionContext<'_>) -> Result<DecisionOutcome, AgentError> {
        let prompt = prompts::decision_prompt(ctx);
        let raw = invoke_with_retry(&self.context_prompt, &prompt, &self.cli).await?;
        parser::parse_decision(&raw, ctx.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_applies_overrides() {
        let config = OracleConfig {
            model: "claude-sonnet-4-5-20250929".to_string(),
            timeout_seconds: 60,
            max_attempts: 5,
            retry_backoff_ms: 250,
            context_prompt: Some("You are negotiating a joint venture.".to_string()),
        };
        let oracle = ClaudeOracle::from_config(&config);
        assert_eq!(oracle.cli.model, "claude-sonnet-4-5-20250929");
        assert_eq!(oracle.cli.timeout, Duration::from_secs(60));
        assert_eq!(oracle.cli.max_attempts, 5);
        assert_eq!(oracle.context_prompt, "You are negotiating a joint venture.");
    }

    #[test]
    fn default_context_prompt_is_used_without_override() {
        let oracle = ClaudeOracle::new(ClaudeCliConfig::default());
        assert!(oracle.context_prompt.contains("paired decision-making game"));
    }
}
