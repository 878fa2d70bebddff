use serde::{Deserialize, Serialize};

use crate::conversation::PerRole;
use crate::task::TaskConfig;

/// Top-level configuration for one negotiation run.
///
/// Passed into the orchestrator as an explicit, immutable value; nothing
/// is read from ambient state, so concurrent runs with different
/// parameters cannot interfere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DyadConfig {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub results: ResultsConfig,
    /// Each role's payoff table and threshold. The two entries may differ
    /// (asymmetric experiments) but must agree on `exchange_count`.
    pub tasks: PerRole<TaskConfig>,
}

/// Configuration for the reasoning-oracle adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OracleConfig {
    /// Model passed to the `claude` CLI.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-call timeout in seconds. A timeout is run-fatal after retries.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Maximum attempts per oracle call; transport failures only.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial backoff between attempts, doubled each retry.
    #[serde(default = "default_backoff")]
    pub retry_backoff_ms: u64,
    /// Override for the scenario preamble shown to both agents.
    #[serde(default)]
    pub context_prompt: Option<String>,
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_timeout() -> u64 {
    45
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> u64 {
    500
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_seconds: default_timeout(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_backoff(),
            context_prompt: None,
        }
    }
}

/// Where completed-run records are appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultsConfig {
    #[serde(default = "default_results_path")]
    pub path: String,
}

fn default_results_path() -> String {
    "data/experiment_results.txt".to_string()
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            path: default_results_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults() {
        let oracle = OracleConfig::default();
        assert_eq!(oracle.model, "claude-3-5-haiku-latest");
        assert_eq!(oracle.timeout_seconds, 45);
        assert_eq!(oracle.max_attempts, 3);
        assert!(oracle.context_prompt.is_none());
        assert_eq!(
            ResultsConfig::default().path,
            "data/experiment_results.txt"
        );
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
[oracle]
model = "claude-sonnet-4-5-20250929"
timeout_seconds = 60

[results]
path = "/tmp/results.txt"

[tasks.initiator]
task_id = 1
threshold = "0.66"
exchange_count = 3

[tasks.initiator.options]
A = { upside = 111, downside = -90 }
Y = { guaranteed = 50 }

[tasks.responder]
task_id = 1
threshold = "0.75"
exchange_count = 3

[tasks.responder.options]
K = { upside = 90, downside = -90 }
Y = { guaranteed = 45 }
"#;
        let config: DyadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.oracle.model, "claude-sonnet-4-5-20250929");
        assert_eq!(config.oracle.max_attempts, 3);
        assert_eq!(config.results.path, "/tmp/results.txt");
        assert_eq!(config.tasks.initiator.threshold, dec!(0.66));
        assert_eq!(config.tasks.responder.threshold, dec!(0.75));
        config.tasks.initiator.validate().unwrap();
        config.tasks.responder.validate().unwrap();
    }
}
