//! Deterministic fast path for search-phrased goals.
//!
//! When the goal says "search for X" and the page already shows a
//! conventional search input, the next action is obvious; probing a short
//! selector list is cheaper and more reproducible than a model round trip.

use page_model::{ActionKind, ActionPlan, ElementDescriptor, PageState};
use tracing::debug;

use element_resolver::selector_for;

type Probe = fn(&ElementDescriptor) -> bool;

/// Conventional search inputs, most specific first. The first visible
/// match wins.
const SEARCH_INPUT_PROBES: &[(&str, Probe)] = &[
    ("input[name=\"q\"]", |el| {
        el.tag == "input" && el.name.as_deref() == Some("q")
    }),
    ("textarea[name=\"q\"]", |el| {
        el.tag == "textarea" && el.name.as_deref() == Some("q")
    }),
    ("#APjFqb", |el| el.id.as_deref() == Some("APjFqb")),
    ("input[type=\"text\"]", |el| {
        el.tag == "input" && el.input_type.as_deref() == Some("text")
    }),
    ("textarea", |el| el.tag == "textarea"),
    ("[aria-label*=\"search\"]", |el| {
        matches!(el.tag.as_str(), "input" | "textarea")
            && el
                .aria_label
                .as_deref()
                .map_or(false, |label| label.to_lowercase().contains("search"))
    }),
];

const TAIL_KEYWORDS: &[&str] = &["search for ", "look up ", "look for ", "search "];

const TAIL_SUFFIXES: &[&str] = &["on this page", "on the page", "in this page"];

/// Extract the query from a search-phrased goal. A quoted phrase wins;
/// otherwise the text after the intent keyword, minus page-referring
/// suffixes. `None` when the goal does not read as a search.
pub fn parse_search_intent(goal: &str) -> Option<String> {
    if !has_search_intent(goal) {
        return None;
    }
    if let Some(phrase) = quoted_phrase(goal) {
        return Some(phrase);
    }
    keyword_tail(goal)
}

/// Whole-word check so "research" or "searching" alone do not trigger.
fn has_search_intent(goal: &str) -> bool {
    let lower = goal.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "search")
        || lower.contains("look up")
        || lower.contains("look for")
}

fn quoted_phrase(goal: &str) -> Option<String> {
    for quote in ['\'', '"'] {
        let mut parts = goal.splitn(3, quote);
        parts.next()?;
        let inner = parts.next();
        let closed = parts.next().is_some();
        if let Some(inner) = inner {
            if closed && !inner.trim().is_empty() {
                return Some(inner.trim().to_string());
            }
        }
    }
    None
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let span = haystack.len().checked_sub(needle.len())?;
    (0..=span).find(|&i| {
        haystack
            .get(i..i + needle.len())
            .map_or(false, |slice| slice.eq_ignore_ascii_case(needle))
    })
}

fn keyword_tail(goal: &str) -> Option<String> {
    for keyword in TAIL_KEYWORDS {
        if let Some(at) = find_ignore_ascii_case(goal, keyword) {
            let mut tail = goal[at + keyword.len()..].trim();
            tail = tail.trim_end_matches(['.', ',', '!', '?', ' ']);
            for suffix in TAIL_SUFFIXES {
                if tail.len() >= suffix.len()
                    && tail[tail.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
                {
                    tail = tail[..tail.len() - suffix.len()].trim_end();
                    break;
                }
            }
            let tail = tail.trim_end_matches(['.', ',', '!', '?', ' ']).trim();
            if !tail.is_empty() {
                return Some(tail.to_string());
            }
        }
    }
    None
}

fn find_search_input(state: &PageState) -> Option<(&'static str, &ElementDescriptor)> {
    for (name, probe) in SEARCH_INPUT_PROBES {
        if let Some(el) = state.candidates().find(|el| el.visible && probe(el)) {
            return Some((name, el));
        }
    }
    None
}

/// The shortcut itself: a synthetic full-confidence `type` plan when the
/// goal reads as a search and the page shows a search input. `None` falls
/// through to the model planner.
pub fn search_shortcut(goal: &str, state: &PageState) -> Option<ActionPlan> {
    let query = parse_search_intent(goal)?;
    let (probe, input) = find_search_input(state)?;
    let target = selector_for(input);
    debug!(%target, probe, %query, "search input found, skipping model planning");
    Some(ActionPlan {
        action: ActionKind::Type,
        target,
        value: Some(query),
        confidence: 1.0,
        reasoning: "goal asks for a search and the page has a search input".into(),
    })
}
