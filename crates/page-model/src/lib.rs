//! Shared data model for the pagepilot agent.
//!
//! Everything in this crate is plain data: page snapshots and the element
//! descriptors inside them, the planner's action records, goal verdicts and
//! terminal task outcomes. Behavior lives in the crates that produce or
//! consume these types.

pub mod action;
pub mod page;
pub mod task;
pub mod vision;

pub use action::*;
pub use page::*;
pub use task::*;
pub use vision::*;
