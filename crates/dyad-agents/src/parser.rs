//! Extraction and validation of oracle responses.
//!
//! The oracle is asked for bare JSON, but real output arrives wrapped in
//! markdown fences or prose often enough that extraction has to tolerate
//! both. Validation is strict the other way: a missing field or a belief
//! outside `[0, 100]` is an [`AgentError::OracleFormat`], never a value to
//! repair, so oracle malfunction stays visible in the experiment log.

use serde_json::Value;

use dyad_models::conversation::Role;
use dyad_models::outcome::{BeliefOutcome, DecisionOutcome, ExchangeOutcome};
use dyad_models::decision::Strategy;

use crate::error::{AgentError, Phase};

/// Find the first parseable JSON object in `text`.
pub fn extract_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Scan for balanced { ... } candidates; fenced or prefixed JSON is
    // still brace-balanced in the raw text, so one pass covers both.
    let mut from = 0;
    while let Some(offset) = trimmed[from..].find('{') {
        let start = from + offset;
        match balanced_end(trimmed, start) {
            Some(end) => {
                if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                    if value.is_object() {
                        return Some(value);
                    }
                }
                from = start + 1;
            }
            None => break,
        }
    }
    None
}

/// Byte index of the `}` closing the object that opens at `start`,
/// skipping braces inside string literals.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn require<'a>(obj: &'a Value, name: &str) -> Result<&'a Value, String> {
    obj.get(name)
        .ok_or_else(|| format!("missing field `{name}`"))
}

fn text_field(obj: &Value, name: &str) -> Result<String, String> {
    require(obj, name)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| format!("field `{name}` is not a string"))
}

/// An integer percentage in `[0, 100]`. Floats and strings are rejected,
/// not coerced.
fn percent_field(obj: &Value, name: &str) -> Result<u8, String> {
    let n = require(obj, name)?
        .as_i64()
        .ok_or_else(|| format!("field `{name}` is not an integer"))?;
    if !(0..=100).contains(&n) {
        return Err(format!("field `{name}` value {n} is outside [0, 100]"));
    }
    Ok(n as u8)
}

fn format_err(phase: Phase, role: Role, detail: impl Into<String>, raw: &str) -> AgentError {
    AgentError::OracleFormat {
        phase,
        role,
        detail: detail.into(),
        raw: raw.to_string(),
    }
}

/// Parse a belief-formation response:
/// `{"belief": N, "reasoning": "...", "message_to_partner": "..."}`.
pub fn parse_belief(raw: &str, role: Role) -> Result<BeliefOutcome, AgentError> {
    let phase = Phase::BeliefFormation;
    let obj =
        extract_object(raw).ok_or_else(|| format_err(phase, role, "no JSON object found", raw))?;
    let belief = percent_field(&obj, "belief").map_err(|d| format_err(phase, role, d, raw))?;
    let message =
        text_field(&obj, "message_to_partner").map_err(|d| format_err(phase, role, d, raw))?;
    Ok(BeliefOutcome { belief, message })
}

/// Parse an exchange-turn response:
/// `{"reply_to_partner": "...", "updated_belief": N, "predicted_partner_belief": N}`.
pub fn parse_exchange(raw: &str, role: Role, round: u32) -> Result<ExchangeOutcome, AgentError> {
    let phase = Phase::Exchange(round);
    let obj =
        extract_object(raw).ok_or_else(|| format_err(phase, role, "no JSON object found", raw))?;
    let message =
        text_field(&obj, "reply_to_partner").map_err(|d| format_err(phase, role, d, raw))?;
    let updated_belief =
        percent_field(&obj, "updated_belief").map_err(|d| format_err(phase, role, d, raw))?;
    let predicted_partner_belief = percent_field(&obj, "predicted_partner_belief")
        .map_err(|d| format_err(phase, role, d, raw))?;
    Ok(ExchangeOutcome {
        message,
        updated_belief,
        predicted_partner_belief,
    })
}

/// Parse a decision response:
/// `{"choice": "...", "strategy": "collaborative"|"individual", "reasoning": "..."}`.
///
/// Option-set membership is checked by the resolver, which owns the task.
pub fn parse_decision(raw: &str, role: Role) -> Result<DecisionOutcome, AgentError> {
    let phase = Phase::Decision;
    let obj =
        extract_object(raw).ok_or_else(|| format_err(phase, role, "no JSON object found", raw))?;
    let choice = text_field(&obj, "choice").map_err(|d| format_err(phase, role, d, raw))?;
    let strategy_value = require(&obj, "strategy")
        .map_err(|d| format_err(phase, role, d, raw))?
        .clone();
    let strategy: Strategy = serde_json::from_value(strategy_value).map_err(|_| {
        format_err(
            phase,
            role,
            "field `strategy` must be \"collaborative\" or \"individual\"",
            raw,
        )
    })?;
    let reasoning = text_field(&obj, "reasoning").map_err(|d| format_err(phase, role, d, raw))?;
    Ok(DecisionOutcome {
        choice,
        strategy,
        reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_clean_json() {
        let value = extract_object(r#"{"belief": 60}"#).unwrap();
        assert_eq!(value["belief"], 60);
    }

    #[test]
    fn extracts_from_markdown_fence() {
        let raw = "Here's my answer:\n```json\n{\"belief\": 60}\n```\nLet me know.";
        let value = extract_object(raw).unwrap();
        assert_eq!(value["belief"], 60);
    }

    #[test]
    fn extracts_with_prefix_text() {
        let raw = "Based on the payoffs: {\"belief\": 72, \"message_to_partner\": \"hi\"}";
        let value = extract_object(raw).unwrap();
        assert_eq!(value["belief"], 72);
    }

    #[test]
    fn handles_braces_inside_strings() {
        let raw = r#"{"reply_to_partner": "terms {firm}", "updated_belief": 55, "predicted_partner_belief": 60}"#;
        let outcome = parse_exchange(raw, Role::Responder, 1).unwrap();
        assert_eq!(outcome.message, "terms {firm}");
        assert_eq!(outcome.updated_belief, 55);
    }

    #[test]
    fn no_json_is_an_error() {
        let err = parse_belief("I would rather chat.", Role::Initiator).unwrap_err();
        assert!(matches!(err, AgentError::OracleFormat { .. }));
    }

    #[test]
    fn belief_out_of_range_is_an_error() {
        let raw = r#"{"belief": 140, "message_to_partner": "hi"}"#;
        let err = parse_belief(raw, Role::Initiator).unwrap_err();
        match err {
            AgentError::OracleFormat { detail, raw: kept, .. } => {
                assert!(detail.contains("outside [0, 100]"), "{detail}");
                assert!(kept.contains("140"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fractional_belief_is_rejected() {
        let raw = r#"{"belief": 62.5, "message_to_partner": "hi"}"#;
        assert!(parse_belief(raw, Role::Initiator).is_err());
    }

    #[test]
    fn missing_prediction_field_is_an_error() {
        let raw = r#"{"reply_to_partner": "ok", "updated_belief": 40}"#;
        let err = parse_exchange(raw, Role::Responder, 2).unwrap_err();
        match err {
            AgentError::OracleFormat { phase, detail, .. } => {
                assert_eq!(phase, Phase::Exchange(2));
                assert!(detail.contains("predicted_partner_belief"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parses_full_exchange_response() {
        let raw = "```json\n{\"reply_to_partner\": \"I'm in if you are\", \"updated_belief\": 68, \"predicted_partner_belief\": 72}\n```";
        let outcome = parse_exchange(raw, Role::Responder, 2).unwrap();
        assert_eq!(outcome.updated_belief, 68);
        assert_eq!(outcome.predicted_partner_belief, 72);
    }

    #[test]
    fn parses_decision_response() {
        let raw = r#"{"choice": "Y", "strategy": "individual", "reasoning": "guaranteed beats the risk"}"#;
        let outcome = parse_decision(raw, Role::Responder).unwrap();
        assert_eq!(outcome.choice, "Y");
        assert_eq!(outcome.strategy, Strategy::Individual);
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        let raw = r#"{"choice": "A", "strategy": "defect", "reasoning": "?"}"#;
        let err = parse_decision(raw, Role::Initiator).unwrap_err();
        match err {
            AgentError::OracleFormat { detail, .. } => assert!(detail.contains("strategy")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
