use std::future::Future;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AgentError;

/// Configuration for `claude` CLI invocations, including the retry policy
/// applied to transport failures.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    pub model: String,
    pub timeout: Duration,
    /// Total attempts per call. Transport failures and timeouts retry up
    /// to this bound; malformed responses never retry.
    pub max_attempts: u32,
    /// Delay before the first retry, doubled after each attempt.
    pub retry_backoff: Duration,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-latest".to_string(),
            timeout: Duration::from_secs(45),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// One `claude` CLI invocation. Returns raw stdout.
pub async fn invoke_claude(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, AgentError> {
    debug!(model = %config.model, "invoking claude CLI");

    let invocation = Command::new("claude")
        .args([
            "-p",
            user_prompt,
            "--system-prompt",
            system_prompt,
            "--model",
            &config.model,
            "--output-format",
            "text",
        ])
        .output();

    let output = tokio::time::timeout(config.timeout, invocation)
        .await
        .map_err(|_| AgentError::Timeout(config.timeout.as_secs()))?
        .map_err(|e| AgentError::Transport(format!("failed to spawn claude: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AgentError::Transport(format!(
            "claude exited {}: {stderr}",
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if stdout.trim().is_empty() {
        return Err(AgentError::Transport("claude returned no output".to_string()));
    }
    Ok(stdout)
}

/// Invoke with the configured retry policy. Retries suspend the whole
/// pipeline; no other turn runs while a call is being retried.
pub async fn invoke_with_retry(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, AgentError> {
    with_retry(config.max_attempts, config.retry_backoff, || {
        invoke_claude(system_prompt, user_prompt, config)
    })
    .await
}

/// Run `op` up to `max_attempts` times, sleeping `initial_backoff` doubled
/// per retry. Only retryable errors (transport, timeout) are retried.
pub async fn with_retry<T, F, Fut>(
    max_attempts: u32,
    initial_backoff: Duration,
    mut op: F,
) -> Result<T, AgentError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AgentError>>,
{
    let mut backoff = initial_backoff;
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(attempt, error = %err, "oracle call failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Check whether the `claude` CLI is on PATH and responds.
pub async fn check_cli_available() -> bool {
    match Command::new("claude").arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}
