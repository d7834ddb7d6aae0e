use thiserror::Error;

use nav_control::NavError;

use crate::llm::LlmError;

/// Errors raised out of a task run.
///
/// Orderly failures (no plan, failed execution, max steps) never surface
/// here; they become a failed report directly. Only conditions that break
/// the run itself are errors, and only non-fatal ones qualify for a task
/// retry.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The last actions repeated identically; retrying would reproduce
    /// the same loop.
    #[error("action loop detected: {action} on {target:?} repeated {count} times")]
    ActionLoop {
        action: String,
        target: String,
        count: usize,
    },

    /// Stop was requested and observed at an iteration boundary.
    #[error("task cancelled")]
    Cancelled,

    #[error(transparent)]
    Navigation(#[from] NavError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    /// A step broke in a way the loop cannot classify.
    #[error("step failed: {0}")]
    Step(String),
}

impl AgentError {
    pub fn step(message: impl Into<String>) -> Self {
        Self::Step(message.into())
    }

    /// Fatal errors terminate the task immediately, bypassing the
    /// task-level retry wrapper.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ActionLoop { .. } | Self::Cancelled)
    }

    /// Whether a fresh attempt (after page recovery and backoff) could
    /// plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ActionLoop { .. } | Self::Cancelled => false,
            Self::Navigation(nav) => nav.is_retryable(),
            Self::Llm(_) | Self::Step(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_and_cancel_are_fatal() {
        let looped = AgentError::ActionLoop {
            action: "click".into(),
            target: "#a".into(),
            count: 3,
        };
        assert!(looped.is_fatal());
        assert!(!looped.is_retryable());

        assert!(AgentError::Cancelled.is_fatal());
        assert!(!AgentError::Cancelled.is_retryable());
    }

    #[test]
    fn test_navigation_retryability_follows_nav_error() {
        let timeout = AgentError::from(NavError::LoadTimeout);
        assert!(timeout.is_retryable());
        assert!(!timeout.is_fatal());

        let invalid = AgentError::from(NavError::EmptyUrl);
        assert!(!invalid.is_retryable());
    }

    #[test]
    fn test_step_errors_are_retryable() {
        assert!(AgentError::step("script runner went away").is_retryable());
    }
}
