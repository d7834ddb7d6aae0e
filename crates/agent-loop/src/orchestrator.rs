//! The task state machine.
//!
//! `run` wraps `run_once` in the task-level retry: unexpected errors get
//! page recovery, a backoff and a fresh attempt; fatal conditions (action
//! loop, cancellation) and orderly failures never retry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use content_insight::{analyze_page, ContentReport};
use element_resolver::{ElementResolver, ResolverConfig};
use nav_control::{NavConfig, Navigator, StabilityProbe};
use page_driver::{PageDriver, ProgressSink, TracingSink};
use page_model::{
    ActionHistoryEntry, ActionKind, ActionPlan, PageState, TaskOutcome,
};
use page_perceiver::PagePerceiver;

use crate::cancel::CancelFlag;
use crate::config::AgentConfig;
use crate::errors::AgentError;
use crate::exec::ActionExecutor;
use crate::history::ActionTracker;
use crate::llm::LlmProvider;
use crate::planner::Planner;
use crate::recover::PageRecovery;

/// One task to run: a goal, optionally anchored at a starting URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub goal: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
}

impl TaskSpec {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            start_url: None,
        }
    }

    pub fn with_start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = Some(url.into());
        self
    }
}

/// Terminal report of one task run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub outcome: TaskOutcome,

    /// 1-based step index the run ended at; 0 when it never started.
    pub steps: u32,

    pub message: String,

    pub history: Vec<ActionHistoryEntry>,

    /// Content analysis from the last `extract` action, when one ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<ContentReport>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Owns every collaborator and drives the perceive-plan-act cycle.
pub struct TaskOrchestrator {
    perceiver: PagePerceiver,
    resolver: ElementResolver,
    navigator: Navigator,
    stability: StabilityProbe,
    planner: Planner,
    executor: ActionExecutor,
    recovery: PageRecovery,
    config: AgentConfig,
    cancel: CancelFlag,
    sink: Arc<dyn ProgressSink>,
}

impl TaskOrchestrator {
    pub fn new(
        driver: Arc<dyn PageDriver>,
        llm: Arc<dyn LlmProvider>,
        config: AgentConfig,
        nav_config: NavConfig,
    ) -> Self {
        Self {
            perceiver: PagePerceiver::new(driver.clone()),
            resolver: ElementResolver::new(ResolverConfig::default()),
            navigator: Navigator::new(driver.clone(), nav_config),
            stability: StabilityProbe::new(driver.clone(), nav_config),
            planner: Planner::new(llm, config),
            executor: ActionExecutor::new(driver.clone()),
            recovery: PageRecovery::new(driver).with_reload_timeout(nav_config.load_timeout()),
            config,
            cancel: CancelFlag::new(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Swap in a resolver, e.g. one with vision collaborators attached.
    pub fn with_resolver(mut self, resolver: ElementResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Flag honored at every iteration boundary; share it with whoever may
    /// request a stop.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    fn emit(&self, line: impl AsRef<str>) {
        self.sink.emit(line.as_ref());
    }

    /// Run one task to its terminal report.
    pub async fn run(&self, spec: &TaskSpec) -> TaskReport {
        self.emit(format!("Task: {}", spec.goal));
        let mut tracker = ActionTracker::new(self.config.loop_window);
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_task_attempts {
            if attempt > 1 {
                sleep(self.config.attempt_backoff()).await;
                let usable = self.recovery.recover().await;
                debug!(attempt, usable, "page recovery before retry");
                tracker.clear();
            }

            match self.run_once(spec, &mut tracker).await {
                Ok(report) => return report,
                Err(AgentError::Cancelled) => {
                    return self.report(
                        TaskOutcome::Aborted,
                        tracker.len() as u32,
                        "stop requested",
                        &tracker,
                        None,
                    );
                }
                Err(err) if err.is_fatal() => {
                    return self.report(
                        TaskOutcome::Failed,
                        tracker.len() as u32,
                        err.to_string(),
                        &tracker,
                        None,
                    );
                }
                Err(err) if !err.is_retryable() => {
                    return self.report(
                        TaskOutcome::Failed,
                        tracker.len() as u32,
                        err.to_string(),
                        &tracker,
                        None,
                    );
                }
                Err(err) => {
                    warn!(attempt, error = %err, "task attempt failed");
                    self.emit(format!("Attempt {attempt} failed: {err}"));
                    last_error = err.to_string();
                }
            }
        }

        self.report(
            TaskOutcome::Failed,
            tracker.len() as u32,
            format!(
                "gave up after {} attempts: {last_error}",
                self.config.max_task_attempts
            ),
            &tracker,
            None,
        )
    }

    async fn run_once(
        &self,
        spec: &TaskSpec,
        tracker: &mut ActionTracker,
    ) -> Result<TaskReport, AgentError> {
        if self.cancel.is_stopped() {
            return Err(AgentError::Cancelled);
        }

        let mut extracted: Option<ContentReport> = None;

        if let Some(url) = &spec.start_url {
            self.emit(format!("Navigating to {url}"));
            let landed = self.navigator.navigate(url).await?;
            debug!(%landed, "initial navigation settled");
            self.stability.install().await;
        }

        for step in 1..=self.config.max_steps {
            if self.cancel.is_stopped() {
                return Err(AgentError::Cancelled);
            }

            let state = self.perceiver.extract().await;
            debug!(step, url = %state.url, elements = state.interactive_elements.len(), "state extracted");

            let plan = match self.planner.plan(&spec.goal, &state).await? {
                Some(plan) => plan,
                None => {
                    return Ok(self.report(
                        TaskOutcome::Failed,
                        step,
                        "planner produced no actionable plan",
                        tracker,
                        extracted,
                    ));
                }
            };
            self.emit(format!(
                "Step {step}: {} {} ({})",
                plan.action, plan.target, plan.reasoning
            ));

            let entry = ActionHistoryEntry::new(plan.action, &plan.target, state.url.clone());
            if tracker.would_loop(&entry) {
                return Err(AgentError::ActionLoop {
                    action: plan.action.to_string(),
                    target: plan.target.clone(),
                    count: self.config.loop_window,
                });
            }

            if !self.execute_plan(&spec.goal, &plan, &state, &mut extracted).await? {
                return Ok(self.report(
                    TaskOutcome::Failed,
                    step,
                    format!("action failed: {} on {}", plan.action, plan.target),
                    tracker,
                    extracted,
                ));
            }
            tracker.record(entry);

            if !self.stability.wait_default().await {
                debug!(step, "page still active after stability wait");
            }

            let fresh = self.perceiver.extract().await;
            let verdict = self.planner.check_goal(&spec.goal, &fresh).await?;
            if verdict.is_conclusive(self.config.goal_confidence_floor) {
                let message = if verdict.reasoning.is_empty() {
                    "goal achieved".to_string()
                } else {
                    verdict.reasoning
                };
                return Ok(self.report(TaskOutcome::Achieved, step, message, tracker, extracted));
            }
            debug!(
                step,
                achieved = verdict.achieved,
                confidence = verdict.confidence,
                "goal not yet met"
            );
        }

        Ok(self.report(
            TaskOutcome::Failed,
            self.config.max_steps,
            "max steps reached without achieving the goal",
            tracker,
            extracted,
        ))
    }

    /// Execute one planned action. `Ok(false)` is orderly failure; `Err`
    /// is reserved for conditions the retry wrapper should see.
    async fn execute_plan(
        &self,
        goal: &str,
        plan: &ActionPlan,
        state: &PageState,
        extracted: &mut Option<ContentReport>,
    ) -> Result<bool, AgentError> {
        match plan.action {
            ActionKind::Navigate => {
                let url = plan.value.as_deref().unwrap_or(&plan.target);
                let landed = self.navigator.navigate(url).await?;
                debug!(%landed, "navigated mid-task");
                self.stability.install().await;
                Ok(true)
            }
            ActionKind::Extract => {
                let raw = self.executor.page_text().await;
                let report = analyze_page(goal, state, raw.as_deref());
                self.emit(format!(
                    "Extracted {} section(s), {} result link(s)",
                    report.sections.sections.len(),
                    report.top_results.len()
                ));
                *extracted = Some(report);
                Ok(true)
            }
            _ => {
                if self.executor.execute(plan).await {
                    return Ok(true);
                }
                if plan.action.targets_element() {
                    if let Some(scored) = self.resolver.resolve(&plan.target, state).await {
                        let selector = scored.selector();
                        info!(%selector, score = scored.score, "retrying through resolved element");
                        self.emit(format!("Retrying with resolved element {selector}"));
                        let retry = ActionPlan {
                            target: selector,
                            ..plan.clone()
                        };
                        return Ok(self.executor.execute(&retry).await);
                    }
                }
                Ok(false)
            }
        }
    }

    fn report(
        &self,
        outcome: TaskOutcome,
        steps: u32,
        message: impl Into<String>,
        tracker: &ActionTracker,
        extracted: Option<ContentReport>,
    ) -> TaskReport {
        let message = message.into();
        self.emit(format!("Task {outcome}: {message}"));
        info!(%outcome, steps, %message, "task finished");
        TaskReport {
            outcome,
            steps,
            message,
            history: tracker.entries().to_vec(),
            extracted,
        }
    }
}
