//! One-task-at-a-time execution gate around the orchestrator.

use agent_loop::{TaskOrchestrator, TaskReport, TaskSpec};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SessionError {
    /// A task is already in flight; submissions are rejected, not queued.
    #[error("a task is already running; wait for it or stop it first")]
    Busy,
}

/// Serializes task execution: the page is a single shared surface, so two
/// goals can never drive it concurrently.
pub struct AgentSession {
    orchestrator: TaskOrchestrator,
    gate: Mutex<()>,
}

impl AgentSession {
    pub fn new(orchestrator: TaskOrchestrator) -> Self {
        Self {
            orchestrator,
            gate: Mutex::new(()),
        }
    }

    /// Run one goal to completion. A stop requested for an earlier task
    /// does not carry over.
    pub async fn submit(
        &self,
        goal: &str,
        start_url: Option<&str>,
    ) -> Result<TaskReport, SessionError> {
        let _guard = self.gate.try_lock().map_err(|_| SessionError::Busy)?;
        self.orchestrator.cancel_flag().reset();
        let mut spec = TaskSpec::new(goal);
        if let Some(url) = start_url {
            spec = spec.with_start_url(url);
        }
        Ok(self.orchestrator.run(&spec).await)
    }

    /// Request cancellation of the in-flight task; it stops at its next
    /// step boundary and reports `Aborted`.
    pub fn stop(&self) {
        self.orchestrator.cancel_flag().request_stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_loop::{AgentConfig, CancelFlag, MockLlmProvider, TaskOrchestrator};
    use nav_control::NavConfig;
    use page_driver::testing::ScriptedDriver;
    use page_driver::ProgressSink;
    use page_model::TaskOutcome;
    use std::sync::Arc;

    fn orchestrator(llm: MockLlmProvider) -> TaskOrchestrator {
        TaskOrchestrator::new(
            Arc::new(ScriptedDriver::new()),
            Arc::new(llm),
            AgentConfig::fast(),
            NavConfig::fast(),
        )
    }

    #[tokio::test]
    async fn test_submit_runs_one_task() {
        let session = AgentSession::new(orchestrator(MockLlmProvider::new()));
        // The empty mock plays a model outage; the run exhausts its
        // attempts and fails.
        let report = session.submit("do something", None).await.unwrap();
        assert_eq!(report.outcome, TaskOutcome::Failed);
    }

    #[tokio::test]
    async fn test_second_submission_while_busy_is_rejected() {
        let session = AgentSession::new(orchestrator(MockLlmProvider::new()));
        let guard = session.gate.try_lock().unwrap();

        let err = session.submit("another goal", None).await.unwrap_err();
        assert!(matches!(err, SessionError::Busy));
        drop(guard);

        assert!(session.submit("retry now", None).await.is_ok());
    }

    /// Sink that requests a stop the moment the first step is announced,
    /// standing in for a user hitting Ctrl-C mid-run.
    struct StopOnFirstStep(CancelFlag);

    impl ProgressSink for StopOnFirstStep {
        fn emit(&self, line: &str) {
            if line.starts_with("Step 1:") {
                self.0.request_stop();
            }
        }
    }

    #[tokio::test]
    async fn test_stop_mid_run_aborts_at_the_next_step() {
        let llm = MockLlmProvider::with_responses([
            r##"{"action": "click", "target": "#next", "confidence": 0.9, "reasoning": "go"}"##,
            r#"{"achieved": false, "confidence": 0.9, "reasoning": "not yet"}"#,
        ]);
        let orchestrator = orchestrator(llm);
        let sink = Arc::new(StopOnFirstStep(orchestrator.cancel_flag()));
        let session = AgentSession::new(orchestrator.with_sink(sink));

        let report = session.submit("keep clicking", None).await.unwrap();
        assert_eq!(report.outcome, TaskOutcome::Aborted);
        assert_eq!(report.history.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_stop_does_not_strand_the_next_task() {
        let session = AgentSession::new(orchestrator(MockLlmProvider::new()));
        session.stop();
        let report = session.submit("fresh goal", None).await.unwrap();
        // The stale flag was cleared, so the run proceeded to a normal
        // failure instead of aborting on entry.
        assert_eq!(report.outcome, TaskOutcome::Failed);
    }
}
