//! Prompt templates for planning and goal checking.
//!
//! Each call sends one self-contained prompt string: instructions, the
//! serialized page context, and the exact output shape expected back.

use page_model::{ElementDescriptor, PageState};

use crate::config::AgentConfig;
use content_insight::ranked_links;

/// How many ranked navigation links are surfaced to the planner.
const PROMPT_LINK_LIMIT: usize = 3;

/// How much flattened page text a goal check sees.
const GOAL_TEXT_LIMIT: usize = 1_500;

pub const PLAN_SYSTEM_PROMPT: &str = r#"You are a web automation assistant.
Analyze the current page state and the goal, then choose the single next best action.

Allowed actions:
- "click": click a visible element; target is the element's text or a CSS selector
- "type": enter text into an input; target is the input, value is the text
- "scroll": scroll the page; target is "up" or "down"
- "navigate": open a URL; target is the URL
- "wait": let the page settle; target is ignored
- "extract": read the current page content for the goal; target is ignored

Respond with exactly one JSON object and nothing else:
{
  "action": "click|type|scroll|navigate|wait|extract",
  "target": "element text, selector, URL or direction",
  "value": "text to type (type action only)",
  "confidence": 0.0 to 1.0,
  "reasoning": "why this action moves toward the goal"
}"#;

pub const GOAL_SYSTEM_PROMPT: &str = r#"You are a web automation assistant.
Decide whether the current page state shows that the goal has been achieved.

Respond with exactly one JSON object and nothing else:
{
  "achieved": true or false,
  "confidence": 0.0 to 1.0,
  "reasoning": "what on the page supports this verdict"
}"#;

/// Truncate to `max` characters with an ellipsis marker.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn element_line(el: &ElementDescriptor, text_limit: usize) -> String {
    let mut line = format!("- {} \"{}\"", el.tag, truncate(el.match_text(), text_limit));
    if let Some(role) = &el.role {
        line.push_str(&format!(" role={}", role));
    }
    if el.clickable {
        line.push_str(" [clickable]");
    }
    line
}

/// Full planning prompt: instructions, goal, page summary, visible
/// elements and the navigation links whose paths best match the goal.
pub fn build_plan_prompt(goal: &str, state: &PageState, config: &AgentConfig) -> String {
    let mut prompt = String::from(PLAN_SYSTEM_PROMPT);

    prompt.push_str("\n\n## Goal\n");
    prompt.push_str(goal);

    prompt.push_str("\n\n## Current Page\n");
    prompt.push_str(&format!("URL: {}\n", state.url));
    if !state.title.is_empty() {
        prompt.push_str(&format!("Title: {}\n", state.title));
    }

    let visible: Vec<&ElementDescriptor> = state
        .interactive_elements
        .iter()
        .filter(|el| el.visible)
        .take(config.max_elements_in_prompt)
        .collect();
    prompt.push_str(&format!("\n## Visible Elements ({})\n", visible.len()));
    for el in visible {
        prompt.push_str(&element_line(el, config.element_text_limit));
        prompt.push('\n');
    }

    let nav: Vec<&ElementDescriptor> = state
        .navigation_elements
        .iter()
        .filter(|el| el.visible)
        .take(config.max_elements_in_prompt)
        .collect();
    if !nav.is_empty() {
        prompt.push_str("\n## Navigation\n");
        for el in &nav {
            let href = el.href.as_deref().unwrap_or("");
            prompt.push_str(&format!(
                "- \"{}\" -> {}\n",
                truncate(el.match_text(), config.element_text_limit),
                truncate(href, 80)
            ));
        }
    }

    let promising = ranked_links(&state.navigation_elements, goal, PROMPT_LINK_LIMIT);
    if !promising.is_empty() {
        prompt.push_str("\n## Promising Links\nThese link paths mention goal terms:\n");
        for (el, score) in promising {
            let href = el.href.as_deref().unwrap_or("");
            prompt.push_str(&format!(
                "- \"{}\" -> {} (relevance {:.2})\n",
                truncate(el.match_text(), config.element_text_limit),
                truncate(href, 80),
                score
            ));
        }
    }

    prompt.push_str("\nRespond with the JSON object only.");
    prompt
}

/// Goal-check prompt against a refreshed page state.
pub fn build_goal_prompt(goal: &str, state: &PageState) -> String {
    let mut prompt = String::from(GOAL_SYSTEM_PROMPT);

    prompt.push_str("\n\n## Goal\n");
    prompt.push_str(goal);

    prompt.push_str("\n\n## Current Page\n");
    prompt.push_str(&format!("URL: {}\n", state.url));
    if !state.title.is_empty() {
        prompt.push_str(&format!("Title: {}\n", state.title));
    }
    if !state.visible_text.is_empty() {
        prompt.push_str(&format!(
            "\n## Visible Text\n{}\n",
            truncate(&state.visible_text, GOAL_TEXT_LIMIT)
        ));
    }

    prompt.push_str("\nRespond with the JSON object only.");
    prompt
}
