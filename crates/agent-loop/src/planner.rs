//! Next-action planning and goal checking against the model.

use std::sync::Arc;

use tracing::{debug, warn};

use page_model::{ActionPlan, GoalVerdict, PageState};

use crate::config::AgentConfig;
use crate::llm::{LlmError, LlmProvider};
use crate::parse::{parse_action_plan, parse_goal_verdict};
use crate::prompt::{build_goal_prompt, build_plan_prompt};
use crate::search::search_shortcut;

/// Turns (goal, page state) into at most one validated plan per step.
///
/// `Ok(None)` means the model gave no usable plan, an orderly outcome.
/// `Err` is a transport failure and is retryable a level up.
pub struct Planner {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    pub async fn plan(
        &self,
        goal: &str,
        state: &PageState,
    ) -> Result<Option<ActionPlan>, LlmError> {
        if let Some(plan) = search_shortcut(goal, state) {
            return Ok(Some(plan));
        }

        let prompt = build_plan_prompt(goal, state, &self.config);
        let response = self.llm.complete(&prompt).await?;

        let plan = match parse_action_plan(&response) {
            Some(plan) => plan,
            None => {
                warn!("model response did not contain a usable plan");
                return Ok(None);
            }
        };

        if !plan.meets_confidence_floor(self.config.plan_confidence_floor) {
            debug!(
                confidence = plan.confidence,
                floor = self.config.plan_confidence_floor,
                "plan below confidence floor, discarding"
            );
            return Ok(None);
        }

        debug!(action = %plan.action, target = %plan.target, confidence = plan.confidence, "planned");
        Ok(Some(plan))
    }

    /// Ask whether `goal` is achieved on the refreshed `state`. An
    /// unparseable reply is an inconclusive verdict, not an error.
    pub async fn check_goal(&self, goal: &str, state: &PageState) -> Result<GoalVerdict, LlmError> {
        let prompt = build_goal_prompt(goal, state);
        let response = self.llm.complete(&prompt).await?;
        Ok(parse_goal_verdict(&response)
            .unwrap_or_else(|| GoalVerdict::inconclusive("goal check reply was unparseable")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmProvider;
    use page_model::{ActionKind, ElementDescriptor};

    fn planner_with(responses: Vec<&str>) -> (Planner, Arc<MockLlmProvider>) {
        let llm = Arc::new(MockLlmProvider::with_responses(responses));
        (Planner::new(llm.clone(), AgentConfig::default()), llm)
    }

    fn state_with_search_box() -> PageState {
        let mut state = PageState::empty("https://www.google.com/");
        state.interactive_elements.push(ElementDescriptor {
            tag: "textarea".into(),
            name: Some("q".into()),
            visible: true,
            interactive: true,
            ..Default::default()
        });
        state
    }

    #[tokio::test]
    async fn test_search_shortcut_skips_the_model() {
        let (planner, llm) = planner_with(vec![]);
        let plan = planner
            .plan("search for 'cats' on this page", &state_with_search_box())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plan.action, ActionKind::Type);
        assert_eq!(plan.confidence, 1.0);
        assert_eq!(llm.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_confident_plan_accepted() {
        let (planner, _) = planner_with(vec![
            "{\"action\": \"click\", \"target\": \"Login\", \"confidence\": 0.9, \"reasoning\": \"login first\"}",
        ]);
        let plan = planner
            .plan("log in", &PageState::empty("https://x.test/"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plan.action, ActionKind::Click);
        assert_eq!(plan.target, "Login");
    }

    #[tokio::test]
    async fn test_floor_confidence_discarded() {
        let (planner, _) = planner_with(vec![
            "{\"action\": \"click\", \"target\": \"Login\", \"confidence\": 0.7}",
        ]);
        let plan = planner
            .plan("log in", &PageState::empty("https://x.test/"))
            .await
            .unwrap();
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn test_junk_response_is_no_plan() {
        let (planner, _) = planner_with(vec!["I am not sure what to do here."]);
        let plan = planner
            .plan("log in", &PageState::empty("https://x.test/"))
            .await
            .unwrap();
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let (planner, _) = planner_with(vec![]);
        let result = planner.plan("log in", &PageState::empty("https://x.test/")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_goal_check_verdicts() {
        let (planner, _) = planner_with(vec![
            "{\"achieved\": true, \"confidence\": 0.95, \"reasoning\": \"results shown\"}",
            "no json at all",
        ]);
        let state = PageState::empty("https://x.test/");

        let verdict = planner.check_goal("find results", &state).await.unwrap();
        assert!(verdict.is_conclusive(0.8));

        let fallback = planner.check_goal("find results", &state).await.unwrap();
        assert!(!fallback.achieved);
        assert!(!fallback.is_conclusive(0.8));
    }
}
