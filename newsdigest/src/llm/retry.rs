use common::RetryConfig;
use std::time::Duration;

use super::CompletionError;

/// Bounded retry with linear backoff: the wait after failed attempt `n` is `n * step`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub step: Duration,
    pub retryable_codes: Vec<u16>,
    pub retryable_statuses: Vec<String>,
    pub retry_transport_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            step: Duration::from_secs(2),
            retryable_codes: vec![429, 500, 503],
            retryable_statuses: vec!["RESOURCE_EXHAUSTED".to_string()],
            retry_transport_errors: false,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            step: Duration::from_secs(cfg.backoff_step_seconds),
            retryable_codes: cfg.retryable_codes.clone(),
            retryable_statuses: cfg.retryable_statuses.clone(),
            retry_transport_errors: cfg.retry_transport_errors,
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt that follows failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.step * attempt
    }

    pub fn is_retryable(&self, error: &CompletionError) -> bool {
        match error {
            CompletionError::Api { code, status, .. } => {
                self.retryable_codes.contains(code)
                    || status.as_deref().is_some_and(|s| {
                        self.retryable_statuses.iter().any(|r| r.eq_ignore_ascii_case(s))
                    })
            }
            CompletionError::Transport(_) => self.retry_transport_errors,
            CompletionError::Malformed(_) => false,
        }
    }

    /// Whether a failure on `attempt` should be followed by another one.
    pub fn should_retry(&self, attempt: u32, error: &CompletionError) -> bool {
        attempt < self.max_attempts && self.is_retryable(error)
    }
}
