//! dyad - paired-agent negotiation experiment system
//!
//! Two independent agents form private beliefs about the value of
//! collaborating, exchange a fixed number of messages over a shared
//! channel, then each decides between a collaborative and an individual
//! payoff option. The reasoning itself lives behind the
//! [`dyad_agents::ReasoningOracle`] interface; this crate wires the
//! orchestrator, resolver, and result recorder together from one
//! configuration value.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use dyad::models::{DyadConfig, TaskConfig};
//! use dyad::agents::{ExchangeOrchestrator, DecisionResolver, ClaudeOracle};
//! use dyad::results::ResultWriter;
//! ```

pub use dyad_agents as agents;
pub use dyad_models as models;
pub use dyad_results as results;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use dyad_agents::{
    build_result_record, AgentError, ClaudeOracle, DecisionResolver, ExchangeOrchestrator,
    ReasoningOracle,
};
use dyad_models::config::DyadConfig;
use dyad_models::decision::ResultRecord;

/// Build the Claude-backed oracle described by the configuration.
pub fn build_oracle(config: &DyadConfig) -> Arc<dyn ReasoningOracle> {
    Arc::new(ClaudeOracle::from_config(&config.oracle))
}

/// Run one complete negotiation: belief formation, all exchanges, and
/// both decisions, against the given oracle.
///
/// Returns the completed-run record for the caller to persist. On any
/// failure the partial state is dropped and nothing is recorded; a batch
/// driver can catch the error and continue with its next run.
pub async fn run_negotiation(
    config: &DyadConfig,
    oracle: Arc<dyn ReasoningOracle>,
) -> Result<ResultRecord, AgentError> {
    let orchestrator = ExchangeOrchestrator::new(Arc::clone(&oracle), config.tasks.clone())?;
    let outcome = orchestrator.run().await?;
    let resolver = DecisionResolver::new(oracle, config.tasks.clone())?;
    let decisions = resolver.resolve(&outcome).await?;
    Ok(build_result_record(
        &config.tasks,
        &outcome,
        decisions,
        Uuid::new_v4(),
        Utc::now(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use dyad_agents::test_support::ScriptedOracle;
    use dyad_models::conversation::{PerRole, Role};
    use dyad_models::decision::Strategy;
    use dyad_models::task::{TaskConfig, TaskError};

    fn config(exchange_count: u32) -> DyadConfig {
        let mut task = TaskConfig::standard(1, dec!(0.66));
        task.exchange_count = exchange_count;
        DyadConfig {
            oracle: Default::default(),
            results: Default::default(),
            tasks: PerRole::uniform(task),
        }
    }

    #[tokio::test]
    async fn full_run_produces_a_record() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .belief(Role::Initiator, 80, "Shall we build together?")
                .belief(Role::Responder, 55, "unused")
                .reply(Role::Responder, "Convince me.", 60, 70)
                .reply(Role::Initiator, "The upside is worth it.", 82, 64)
                .reply(Role::Responder, "Agreed.", 71, 80)
                .decision(Role::Initiator, "A", Strategy::Collaborative, "above u-value")
                .decision(Role::Responder, "C", Strategy::Collaborative, "persuaded"),
        );
        let record = run_negotiation(&config(2), oracle).await.unwrap();
        assert!(!record.mismatch);
        assert_eq!(record.initial_beliefs.initiator, 80);
        assert_eq!(record.initial_beliefs.responder, 55);
        assert_eq!(record.decisions.initiator.choice, "A");
    }

    #[tokio::test]
    async fn invalid_config_fails_before_any_oracle_call() {
        let oracle = Arc::new(ScriptedOracle::new());
        let record =
            run_negotiation(&config(0), Arc::clone(&oracle) as Arc<dyn ReasoningOracle>).await;
        assert!(matches!(
            record,
            Err(AgentError::Config(TaskError::NoExchanges))
        ));
        assert!(oracle.seen_exchanges().is_empty());
        assert!(oracle.seen_decisions().is_empty());
    }
}
