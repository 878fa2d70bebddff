pub mod belief;
pub mod config;
pub mod conversation;
pub mod decision;
pub mod outcome;
pub mod task;

pub use belief::{BeliefRecord, BeliefSource, PredictionRecord};
pub use config::{DyadConfig, OracleConfig, ResultsConfig};
pub use conversation::{Conversation, PerRole, Role, Turn};
pub use decision::{Decision, ResultRecord, Strategy};
pub use outcome::{BeliefOutcome, DecisionOutcome, ExchangeOutcome};
pub use task::{PayoffOption, TaskConfig, TaskError};
