//! Loop limits and confidence floors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Perceive→plan→act rounds before a task gives up.
    /// Default: 10
    pub max_steps: u32,

    /// A plan executes only when its confidence is strictly above this.
    /// Default: 0.7
    pub plan_confidence_floor: f64,

    /// A goal verdict concludes the task only when achieved and strictly
    /// above this.
    /// Default: 0.8
    pub goal_confidence_floor: f64,

    /// Whole-task attempts on unexpected errors.
    /// Default: 3
    pub max_task_attempts: u32,

    /// Fixed delay between task attempts.
    /// Default: 2000
    pub attempt_backoff_ms: u64,

    /// Consecutive identical actions that count as a loop. The entry
    /// after a full window is refused.
    /// Default: 3
    pub loop_window: usize,

    /// Most elements listed in a planning prompt.
    /// Default: 20
    pub max_elements_in_prompt: usize,

    /// Element text is truncated to this many characters in prompts.
    /// Default: 60
    pub element_text_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            plan_confidence_floor: 0.7,
            goal_confidence_floor: 0.8,
            max_task_attempts: 3,
            attempt_backoff_ms: 2_000,
            loop_window: 3,
            max_elements_in_prompt: 20,
            element_text_limit: 60,
        }
    }
}

impl AgentConfig {
    /// Near-zero delays for offline runs and tests.
    pub fn fast() -> Self {
        Self {
            attempt_backoff_ms: 0,
            ..Self::default()
        }
    }

    pub fn attempt_backoff(&self) -> Duration {
        Duration::from_millis(self.attempt_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.plan_confidence_floor, 0.7);
        assert_eq!(config.goal_confidence_floor, 0.8);
        assert_eq!(config.loop_window, 3);
        assert_eq!(config.attempt_backoff(), Duration::from_secs(2));
    }

    #[test]
    fn test_fast_preset_keeps_semantics() {
        let config = AgentConfig::fast();
        assert_eq!(config.max_steps, 10);
        assert!(config.attempt_backoff().is_zero());
    }
}
