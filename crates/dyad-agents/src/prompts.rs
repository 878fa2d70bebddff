//! Prompt construction for the Claude-backed oracle.
//!
//! The scenario preamble is configuration, not core logic; replace it via
//! [`crate::oracle::ClaudeOracle::with_context_prompt`].
//!
//! Every prompt embeds only the receiving agent's own numbers. The other
//! side's beliefs and predictions never appear here, with one deliberate
//! exception: the decision prompt discloses the partner's *initial* belief.

use std::fmt::Write;

use dyad_models::conversation::{Conversation, Role};
use dyad_models::task::{PayoffOption, TaskConfig};

use crate::oracle::{DecisionContext, ExchangeContext};

/// Scenario preamble sent as the system prompt for every oracle call.
pub const DEFAULT_CONTEXT_PROMPT: &str = "\
You are participating in an experiment as a representative of a LEGO car manufacturing company. Here's your situation:

CONTEXT:
- You represent a LEGO car manufacturing company
- You are a participant in a paired decision-making game
- Your partner represents another LEGO car manufacturing company
- You can build simple LEGO cars alone, or complex ones through collaboration
- Collaboration is high risk, high reward with potential for large sunk costs if it fails

GAME RULES:
- You will complete several tasks to maximize your points
- Points are earned individually, not shared with your partner
- Points depend on both your decision and your partner's decision
- Some design options are collaborative and require partner cooperation
- One option is an individual design with guaranteed points
- If both choose collaborative designs (any combination), you earn the upside
- If you choose collaborative but your partner chooses individual, you get the downside";

fn option_lines(task: &TaskConfig) -> String {
    let mut lines = String::new();
    for (id, option) in &task.options {
        match option {
            PayoffOption::Collaborative { upside, downside } => {
                let _ = writeln!(lines, "- {id}: Upside = {upside}, Downside = {downside}");
            }
            PayoffOption::Individual { guaranteed } => {
                let _ = writeln!(lines, "- {id}: Guaranteed = {guaranteed}");
            }
        }
    }
    lines.truncate(lines.trim_end().len());
    lines
}

fn tech_failure_line(task: &TaskConfig) -> String {
    match task.tech_failure_rate {
        Some(rate) => format!(
            "\n- Technical failure risk: {} percent (collaboration can fail even when both cooperate)",
            (rate * rust_decimal::Decimal::ONE_HUNDRED).normalize()
        ),
        None => String::new(),
    }
}

/// Render the shared channel from one agent's point of view. Only message
/// text is shown; the numeric state attached to each turn stays private.
fn transcript(history: &Conversation, viewer: Role) -> String {
    let mut lines = Vec::with_capacity(history.len());
    for turn in history.turns() {
        let whose = if turn.speaker == viewer {
            "Your"
        } else {
            "Your partner's"
        };
        let what = if turn.round == 1 && turn.speaker == Role::Initiator {
            "opening message".to_string()
        } else {
            format!("reply (round {})", turn.round)
        };
        lines.push(format!("{whose} {what}: \"{}\"", turn.message));
    }
    lines.join("\n")
}

/// Prompt for the belief-formation phase, before any message is exchanged.
pub fn belief_formation_prompt(task: &TaskConfig) -> String {
    format!(
        "Your task is to evaluate tasks based on their payoff structures.\n\n\
         Here is the task you need to evaluate:\n\n\
         Task ID: {task_id}\n\
         Options:\n{options}{tech}\n\n\
         What is your assessment of the likelihood (belief), 0-100, that collaboration \
         would be successful in this specific task?\n\
         Also provide a brief explanation of your reasoning. Do not disclose the option \
         you are considering; communicate only whether you want to collaborate or not. \
         You also have the choice to negotiate with the other agent - to convince them \
         to choose collaboration or individual action according to your payoff structure.\n\n\
         Respond in JSON format as follows:\n\
         {{\"belief\": NUMBER, \"reasoning\": \"brief explanation of how you arrived at \
         this belief\", \"message_to_partner\": \"one line message to your partner\"}}",
        task_id = task.task_id,
        options = option_lines(task),
        tech = tech_failure_line(task),
    )
}

/// Prompt for one exchange turn.
pub fn exchange_prompt(ctx: &ExchangeContext<'_>) -> String {
    let mut context_block = format!(
        "- Your current belief: you estimate a {}% chance that collaboration would be successful",
        ctx.own_belief.value
    );
    if let Some(prediction) = ctx.own_prediction {
        let _ = write!(
            context_block,
            "\n- Your previous prediction: after your last message, you estimated your \
             partner's belief was {}%\n  \
             (Compare this with your partner's actual message to adjust your strategy)",
            prediction.value
        );
    }

    format!(
        "You are in a conversation with your partner. Here is the conversation so far:\n\n\
         {transcript}\n\n\
         Context for your reply:\n\
         {context_block}\n\
         - Task options available:\n{options}{tech}\n\n\
         Create a strategic reply message to your partner. Your reply should:\n\
         - Not disclose your specific belief percentage\n\
         - Not disclose which specific option you're considering\n\
         - Be informed by your own assessment and the payoff structure\n\
         - Respond strategically to your partner's latest message\n\
         - Consider the full conversation history and the final position you want to take\n\
         - You can negotiate further, adjust your stance, or finalize your position\n\n\
         After reading your partner's latest message, also provide:\n\
         1. Your UPDATED belief (0-100) about the likelihood of successful collaboration \
         after this exchange\n\
         2. Your PREDICTION (0-100) of what you think your partner's belief is about \
         successful collaboration\n   \
         (This prediction will NOT be shared with your partner)\n\n\
         Respond in JSON format:\n\
         {{\"reply_to_partner\": \"your one line reply message\", \"updated_belief\": NUMBER, \
         \"predicted_partner_belief\": NUMBER}}",
        transcript = transcript(ctx.history, ctx.role),
        options = option_lines(ctx.task),
        tech = tech_failure_line(ctx.task),
    )
}

/// Prompt for the final decision.
pub fn decision_prompt(ctx: &DecisionContext<'_>) -> String {
    let prediction_block = match ctx.own_prediction {
        Some(prediction) => format!(
            "\n**Your Prediction of Partner's Belief**: You estimate that your partner's \
             belief is {}%.",
            prediction.value
        ),
        None => String::new(),
    };
    let collaborative = ctx.task.collaborative_option_ids().join(", ");
    let individual = ctx.task.individual_option_id().unwrap_or("-");
    let guaranteed = ctx.task.guaranteed_payoff().unwrap_or(0);

    format!(
        "Your task is to make a final decision about the given task based on its payoff \
         structure and the u-value.\n\n\
         **Your Initial Assessment**: You initially estimated a {own_initial}% chance that \
         the collaboration would be successful.\n\
         **Your Updated Belief**: After the communication exchanges, your updated belief \
         is {own_final}%.{prediction_block}\n\
         **Partner's Initial Assessment**: Your partner initially estimated a \
         {partner_initial}% chance that the collaboration would be successful.\n\n\
         **Full Communication History**:\n{transcript}\n\n\
         **Your Task Options**:\n{options}\n\n\
         **Key Facts**:\n\
         - The minimum required collaboration belief (\"u-value\"): {threshold} percent\n\
         - A belief exactly equal to the u-value meets the threshold{tech}\n\n\
         Choose your option:\n\
         - Option {collaborative} (collaborative)\n\
         - Option {individual} (individual): guaranteed {guaranteed} points\n\n\
         Make your decision based on:\n\
         1. Your updated belief about collaboration success\n\
         2. Your prediction of what your partner believes\n\
         3. The complete conversation history\n\
         4. The u-value threshold\n\n\
         Respond in JSON format: {{\"choice\": \"<option id>\", \"strategy\": \
         \"collaborative\"/\"individual\", \"reasoning\": \"your explanation\"}}",
        own_initial = ctx.own_initial_belief,
        own_final = ctx.own_final_belief,
        partner_initial = ctx.partner_initial_belief,
        transcript = transcript(ctx.conversation, ctx.role),
        options = option_lines(ctx.task),
        threshold = ctx.task.threshold_percent(),
        tech = tech_failure_line(ctx.task),
    )
}
