use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single payoff option an agent can choose.
///
/// Collaborative options pay `upside` only when both agents pick a
/// collaborative option (any combination); `downside` otherwise. The
/// individual option pays `guaranteed` regardless of the partner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PayoffOption {
    Collaborative { upside: i64, downside: i64 },
    Individual { guaranteed: i64 },
}

impl PayoffOption {
    pub fn is_individual(&self) -> bool {
        matches!(self, PayoffOption::Individual { .. })
    }
}

/// Validation failures for a [`TaskConfig`] or a pair of them.
///
/// All of these are raised at construction time, before any oracle call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(Decimal),

    #[error("exchange_count must be at least 1")]
    NoExchanges,

    #[error("payoff table must contain exactly one individual option, found {0}")]
    IndividualOptionCount(usize),

    #[error("payoff table has no collaborative options")]
    NoCollaborativeOptions,

    #[error("tech_failure_rate {0} is outside [0, 1)")]
    FailureRateOutOfRange(Decimal),

    #[error("initiator and responder disagree on exchange_count ({0} vs {1})")]
    ExchangeCountMismatch(u32, u32),
}

/// Immutable description of one negotiation instance as seen by one role:
/// its payoff table, acceptance threshold, and the number of exchanges.
///
/// The threshold (u-value) is the minimum collaboration belief, as a
/// fraction in `[0, 1]`, at which choosing a collaborative option is
/// rational. By the decision contract a belief exactly equal to the
/// threshold meets it; the oracle declares the strategy either way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskConfig {
    pub task_id: u32,
    pub options: BTreeMap<String, PayoffOption>,
    pub threshold: Decimal,
    pub exchange_count: u32,
    /// Probability that collaboration fails for technical reasons even
    /// when both agents cooperate. Disabled unless configured.
    #[serde(default)]
    pub tech_failure_rate: Option<Decimal>,
}

impl TaskConfig {
    /// The payoff table from the symmetric experiment: three collaborative
    /// designs A/B/C and the guaranteed individual design Y.
    pub fn standard(task_id: u32, threshold: Decimal) -> Self {
        let mut options = BTreeMap::new();
        options.insert(
            "A".to_string(),
            PayoffOption::Collaborative {
                upside: 111,
                downside: -90,
            },
        );
        options.insert(
            "B".to_string(),
            PayoffOption::Collaborative {
                upside: 92,
                downside: -45,
            },
        );
        options.insert(
            "C".to_string(),
            PayoffOption::Collaborative {
                upside: 77,
                downside: -15,
            },
        );
        options.insert("Y".to_string(), PayoffOption::Individual { guaranteed: 50 });
        Self {
            task_id,
            options,
            threshold,
            exchange_count: 3,
            tech_failure_rate: None,
        }
    }

    /// The asymmetric responder table: K/L/M/Y with a guaranteed payoff of
    /// 45, calibrated so the break-even belief sits at 0.75.
    pub fn asymmetric_responder(task_id: u32) -> Self {
        let mut options = BTreeMap::new();
        options.insert(
            "K".to_string(),
            PayoffOption::Collaborative {
                upside: 90,
                downside: -90,
            },
        );
        options.insert(
            "L".to_string(),
            PayoffOption::Collaborative {
                upside: 75,
                downside: -45,
            },
        );
        options.insert(
            "M".to_string(),
            PayoffOption::Collaborative {
                upside: 65,
                downside: -15,
            },
        );
        options.insert("Y".to_string(), PayoffOption::Individual { guaranteed: 45 });
        Self {
            task_id,
            options,
            threshold: Decimal::new(75, 2),
            exchange_count: 3,
            tech_failure_rate: None,
        }
    }

    /// Check every invariant. Called by the orchestrator before the first
    /// oracle call; invalid configurations never reach the oracle.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.threshold < Decimal::ZERO || self.threshold > Decimal::ONE {
            return Err(TaskError::ThresholdOutOfRange(self.threshold));
        }
        if self.exchange_count == 0 {
            return Err(TaskError::NoExchanges);
        }
        let individual = self.options.values().filter(|o| o.is_individual()).count();
        if individual != 1 {
            return Err(TaskError::IndividualOptionCount(individual));
        }
        if self.options.len() < 2 {
            return Err(TaskError::NoCollaborativeOptions);
        }
        if let Some(rate) = self.tech_failure_rate {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(TaskError::FailureRateOutOfRange(rate));
            }
        }
        Ok(())
    }

    /// Identifier of the single individual (guaranteed) option.
    pub fn individual_option_id(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|(_, o)| o.is_individual())
            .map(|(id, _)| id.as_str())
    }

    /// Guaranteed payoff of the individual option.
    pub fn guaranteed_payoff(&self) -> Option<i64> {
        self.options.values().find_map(|o| match o {
            PayoffOption::Individual { guaranteed } => Some(*guaranteed),
            _ => None,
        })
    }

    /// Identifiers of the collaborative options, in table order.
    pub fn collaborative_option_ids(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|(_, o)| !o.is_individual())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Threshold expressed as a percentage, for prompt text.
    pub fn threshold_percent(&self) -> Decimal {
        (self.threshold * Decimal::ONE_HUNDRED).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn standard_task_is_valid() {
        let task = TaskConfig::standard(1, dec!(0.66));
        task.validate().unwrap();
        assert_eq!(task.individual_option_id(), Some("Y"));
        assert_eq!(task.guaranteed_payoff(), Some(50));
        assert_eq!(task.collaborative_option_ids(), vec!["A", "B", "C"]);
        assert_eq!(task.threshold_percent(), dec!(66));
    }

    #[test]
    fn asymmetric_responder_is_valid() {
        let task = TaskConfig::asymmetric_responder(1);
        task.validate().unwrap();
        assert_eq!(task.collaborative_option_ids(), vec!["K", "L", "M"]);
        assert_eq!(task.guaranteed_payoff(), Some(45));
        assert_eq!(task.threshold_percent(), dec!(75));
    }

    #[test]
    fn rejects_zero_exchanges() {
        let mut task = TaskConfig::standard(1, dec!(0.66));
        task.exchange_count = 0;
        assert_eq!(task.validate(), Err(TaskError::NoExchanges));
    }

    #[test]
    fn rejects_threshold_above_one() {
        let task = TaskConfig::standard(1, dec!(1.5));
        assert_eq!(
            task.validate(),
            Err(TaskError::ThresholdOutOfRange(dec!(1.5)))
        );
    }

    #[test]
    fn rejects_missing_individual_option() {
        let mut task = TaskConfig::standard(1, dec!(0.66));
        task.options.remove("Y");
        assert_eq!(task.validate(), Err(TaskError::IndividualOptionCount(0)));
    }

    #[test]
    fn rejects_two_individual_options() {
        let mut task = TaskConfig::standard(1, dec!(0.66));
        task.options
            .insert("Z".to_string(), PayoffOption::Individual { guaranteed: 40 });
        assert_eq!(task.validate(), Err(TaskError::IndividualOptionCount(2)));
    }

    #[test]
    fn rejects_failure_rate_of_one() {
        let mut task = TaskConfig::standard(1, dec!(0.66));
        task.tech_failure_rate = Some(dec!(1.0));
        assert_eq!(
            task.validate(),
            Err(TaskError::FailureRateOutOfRange(dec!(1.0)))
        );
    }

    #[test]
    fn boundary_thresholds_are_accepted() {
        TaskConfig::standard(1, dec!(0)).validate().unwrap();
        TaskConfig::standard(1, dec!(1)).validate().unwrap();
    }

    #[test]
    fn payoff_option_json_shape_matches_experiment_format() {
        let collab: PayoffOption =
            serde_json::from_str(r#"{"upside": 111, "downside": -90}"#).unwrap();
        assert_eq!(
            collab,
            PayoffOption::Collaborative {
                upside: 111,
                downside: -90
            }
        );
        let solo: PayoffOption = serde_json::from_str(r#"{"guaranteed": 50}"#).unwrap();
        assert!(solo.is_individual());
    }

    #[test]
    fn task_config_roundtrip() {
        let task = TaskConfig::standard(7, dec!(0.66));
        let json = serde_json::to_string(&task).unwrap();
        let parsed: TaskConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(task, parsed);
    }
}
