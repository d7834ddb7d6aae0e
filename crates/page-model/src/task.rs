//! Task identity, goal verdicts and terminal outcomes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one recording/agent session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The model's answer to "is the goal achieved on this page?".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalVerdict {
    pub achieved: bool,

    /// Self-assessed confidence in [0, 1].
    pub confidence: f64,

    #[serde(default)]
    pub reasoning: String,
}

impl GoalVerdict {
    /// Only an affirmative verdict above the floor ends the task.
    pub fn is_conclusive(&self, floor: f64) -> bool {
        self.achieved && self.confidence > floor
    }

    /// Verdict used when the model's answer could not be parsed: keep going.
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        Self {
            achieved: false,
            confidence: 0.0,
            reasoning: reason.into(),
        }
    }
}

/// Terminal state of one task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Goal-check passed.
    Achieved,
    /// Max steps reached, retries exhausted, or unrecoverable failure.
    Failed,
    /// User-requested cancellation.
    Aborted,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Achieved)
    }
}

impl std::fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Achieved => "achieved",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}
