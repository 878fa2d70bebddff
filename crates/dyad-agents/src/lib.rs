pub mod claude_cli;
pub mod error;
pub mod oracle;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod resolver;
pub mod state;

pub mod test_support;

pub use error::{AgentError, Phase};
pub use oracle::{ClaudeOracle, DecisionContext, ExchangeContext, ReasoningOracle};
pub use orchestrator::{ExchangeOrchestrator, NegotiationOutcome};
pub use resolver::{build_result_record, DecisionResolver};
pub use state::AgentState;
