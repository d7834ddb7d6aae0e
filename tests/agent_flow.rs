//! End-to-end agent runs over the bundled replay fixture: the whole
//! perceive-plan-act loop against recorded pages, with a scripted model
//! standing in for the planner.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use agent_loop::{AgentConfig, MockLlmProvider, TaskOrchestrator, TaskSpec};
use nav_control::NavConfig;
use page_driver::PageDriver;
use page_model::{ActionKind, TaskOutcome};
use pagepilot_cli::{AgentSession, ReplayDriver, ReplayFixture};

fn docs_search_driver() -> Arc<ReplayDriver> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/fixtures/docs-search.json");
    Arc::new(ReplayDriver::from_file(&path).expect("bundled fixture loads"))
}

fn orchestrator(driver: Arc<ReplayDriver>, llm: Arc<MockLlmProvider>) -> TaskOrchestrator {
    TaskOrchestrator::new(driver, llm, AgentConfig::fast(), NavConfig::fast())
}

#[tokio::test]
async fn search_goal_completes_in_one_step_without_model_planning() {
    let driver = docs_search_driver();
    let start = driver.start_url().expect("fixture declares a start url");
    let llm = Arc::new(MockLlmProvider::with_responses([
        r#"{"achieved": true, "confidence": 0.95, "reasoning": "results are listed"}"#,
    ]));
    let orch = orchestrator(driver.clone(), llm.clone());

    let report = orch
        .run(&TaskSpec::new("search for 'tokio' on this page").with_start_url(&start))
        .await;

    assert_eq!(report.outcome, TaskOutcome::Achieved);
    assert_eq!(report.steps, 1);
    assert_eq!(report.history.len(), 1);
    assert_eq!(report.history[0].action, ActionKind::Type);
    assert_eq!(report.history[0].target, "input[name=\"q\"]");
    // Planning was the search shortcut; only the goal check hit the model.
    assert_eq!(llm.prompt_count(), 1);
    // The fixture's form-submit rule moved the page to the results URL.
    assert_eq!(
        driver.current_url().await,
        "https://devsearch.test/search?q=tokio"
    );
}

#[tokio::test]
async fn full_run_types_clicks_and_extracts_across_three_pages() {
    let driver = docs_search_driver();
    let start = driver.start_url().unwrap();
    let llm = Arc::new(MockLlmProvider::with_responses([
        // Step 1 plans via the shortcut; first call is its goal check.
        r#"{"achieved": false, "confidence": 0.9, "reasoning": "results listed, tutorial not open"}"#,
        r#"{"action": "click", "target": "Tokio tutorial", "confidence": 0.85, "reasoning": "open the tutorial result"}"#,
        r#"{"achieved": false, "confidence": 0.85, "reasoning": "tutorial open, content not captured"}"#,
        r#"{"action": "extract", "target": "page", "confidence": 0.9, "reasoning": "capture the tutorial content"}"#,
        r#"{"achieved": true, "confidence": 0.95, "reasoning": "tutorial content captured"}"#,
    ]));
    let orch = orchestrator(driver.clone(), llm.clone());

    let report = orch
        .run(&TaskSpec::new("search for 'tokio' and open the tutorial").with_start_url(&start))
        .await;

    assert_eq!(report.outcome, TaskOutcome::Achieved);
    assert_eq!(report.steps, 3);
    let actions: Vec<ActionKind> = report.history.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![ActionKind::Type, ActionKind::Click, ActionKind::Extract]
    );
    assert_eq!(report.history[1].url, "https://devsearch.test/search?q=tokio");
    assert_eq!(report.history[2].url, "https://tokio.rs/tokio/tutorial");
    assert_eq!(llm.prompt_count(), 5);

    let extracted = report.extracted.expect("extract step attaches a report");
    assert_eq!(extracted.url, "https://tokio.rs/tokio/tutorial");
    let titles: Vec<&str> = extracted
        .sections
        .sections
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert!(titles.contains(&"Getting Started"));
    assert!(titles.contains(&"Setup"));
    assert_eq!(extracted.sections.steps.len(), 3);
    assert_eq!(extracted.sections.code_blocks.len(), 1);
    assert!(extracted
        .sections
        .versions
        .contains(&"v1.39".to_string()));
    // The tutorial page links both ways; they surface as ranked results.
    assert_eq!(extracted.top_results.len(), 2);
    // The onward link's URL path carries two goal terms, so it is the hint.
    let next = extracted.next_link.expect("tutorial page has an onward link");
    assert_eq!(next.href, "https://tokio.rs/tokio/tutorial/spawning");
}

#[tokio::test]
async fn session_carries_page_state_between_goals() {
    let driver = docs_search_driver();
    let start = driver.start_url().unwrap();
    let llm = Arc::new(MockLlmProvider::with_responses([
        // First goal: the search shortcut plus its goal check.
        r#"{"achieved": true, "confidence": 0.9, "reasoning": "results shown"}"#,
        // Second goal starts on the results page the first one left behind.
        r#"{"action": "extract", "target": "page", "confidence": 0.9, "reasoning": "summarize the listing"}"#,
        r#"{"achieved": true, "confidence": 0.9, "reasoning": "listing summarized"}"#,
    ]));
    let session = AgentSession::new(orchestrator(driver.clone(), llm));

    let first = session
        .submit("search for 'tokio' on this page", Some(&start))
        .await
        .unwrap();
    assert_eq!(first.outcome, TaskOutcome::Achieved);

    let second = session
        .submit("summarize the result listing", None)
        .await
        .unwrap();
    assert_eq!(second.outcome, TaskOutcome::Achieved);
    let extracted = second.extracted.expect("extract ran on the results page");
    assert_eq!(extracted.url, "https://devsearch.test/search?q=tokio");
    assert_eq!(extracted.top_results.len(), 3);
    // The GitHub result outranks the stale forum thread.
    assert_eq!(
        extracted.top_results[0].result.url,
        "https://github.com/tokio-rs/tokio"
    );
    // No link path on the listing matches the goal wording.
    assert!(extracted.next_link.is_none());
}

#[tokio::test]
async fn broken_page_load_exhausts_task_attempts() {
    let fixture: ReplayFixture = serde_json::from_value(json!({
        "start_url": "https://flaky.test/",
        "pages": {
            "https://flaky.test/": {
                "survey": { "title": "Flaky" },
                "load": "failed"
            }
        }
    }))
    .unwrap();
    let driver = Arc::new(ReplayDriver::new(fixture));
    let llm = Arc::new(MockLlmProvider::new());
    let orch = orchestrator(driver, llm.clone());

    let report = orch
        .run(&TaskSpec::new("read the page").with_start_url("https://flaky.test/"))
        .await;

    assert_eq!(report.outcome, TaskOutcome::Failed);
    assert!(report.message.contains("gave up after 3 attempts"));
    assert!(report.message.contains("load failure"));
    // Navigation never settled, so planning never started.
    assert_eq!(llm.prompt_count(), 0);
}
