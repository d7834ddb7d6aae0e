//! PagePilot binary crate.
//!
//! Exposes the CLI surface plus the session, driver and recording layers
//! for integration testing.

pub mod cli;
pub mod config;
pub mod driver;
pub mod llm;
pub mod recording;
pub mod session;

pub use config::AppConfig;
pub use driver::{ReplayDriver, ReplayFixture};
pub use session::{AgentSession, SessionError};
