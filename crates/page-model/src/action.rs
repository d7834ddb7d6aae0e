//! Planner output and the executed-action history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The set of UI actions the planner may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Type,
    Scroll,
    Navigate,
    Wait,
    Extract,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Type => "type",
            Self::Scroll => "scroll",
            Self::Navigate => "navigate",
            Self::Wait => "wait",
            Self::Extract => "extract",
        }
    }

    /// Actions that address a concrete page element and are therefore
    /// eligible for resolver fallback when direct execution fails.
    pub fn targets_element(&self) -> bool {
        matches!(self, Self::Click | Self::Type)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete next action chosen by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub action: ActionKind,

    /// Selector or textual description of the action target.
    pub target: String,

    /// Text to type, URL to open, scroll amount; action-dependent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Planner self-assessed confidence in [0, 1].
    pub confidence: f64,

    #[serde(default)]
    pub reasoning: String,
}

impl ActionPlan {
    /// A plan at or below the floor must never reach execution.
    pub fn meets_confidence_floor(&self, floor: f64) -> bool {
        self.confidence > floor
    }
}

/// Record of one executed action, kept for loop detection only.
///
/// Unbounded growth within one task run is fine; the tracker is cleared
/// between tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionHistoryEntry {
    pub action: ActionKind,
    pub target: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

impl ActionHistoryEntry {
    pub fn new(action: ActionKind, target: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            action,
            target: target.into(),
            url: url.into(),
            timestamp: Utc::now(),
        }
    }

    /// Two entries with the same signature represent the agent doing the
    /// same thing in the same place; timestamps are ignored.
    pub fn same_signature(&self, other: &Self) -> bool {
        self.action == other.action && self.target == other.target && self.url == other.url
    }
}
