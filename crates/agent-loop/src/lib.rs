//! The goal-directed agent loop.
//!
//! One task run is a bounded perceive-plan-act cycle: extract the page,
//! ask the planner for one action, execute it (with resolver fallback for
//! element-addressed actions), track history for loop detection, then ask
//! the model whether the goal is met. The orchestrator owns all state and
//! is the single place that turns component-level "no result" values into
//! a terminal task outcome.

pub mod cancel;
pub mod config;
pub mod errors;
pub mod exec;
pub mod history;
pub mod llm;
pub mod orchestrator;
pub mod parse;
pub mod planner;
pub mod prompt;
pub mod recover;
pub mod search;

pub use cancel::CancelFlag;
pub use config::AgentConfig;
pub use errors::AgentError;
pub use exec::ActionExecutor;
pub use history::ActionTracker;
pub use llm::{LlmError, LlmProvider, MockLlmProvider};
pub use orchestrator::{TaskOrchestrator, TaskReport, TaskSpec};
pub use parse::{extract_json_object, parse_action_plan, parse_goal_verdict};
pub use planner::Planner;
pub use recover::PageRecovery;
pub use search::search_shortcut;
