//! Recovering typed records from free-form model output.
//!
//! Model responses arrive wrapped in anything from code fences to chatty
//! commentary to stray `//` comments. Parsing is a normal outcome path:
//! every function here returns `Option` and the caller treats `None` as
//! "no plan this step".

use serde::Deserialize;
use tracing::debug;

use page_model::{ActionKind, ActionPlan, GoalVerdict};

/// Pull the first JSON object out of a raw response: direct, fenced
/// (` ```json ... ``` `), or embedded in surrounding prose.
pub fn extract_json_object(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return balanced_object(trimmed);
    }

    let fence = "```";
    if let Some(start) = raw.find(fence) {
        let after_fence = &raw[start + fence.len()..];
        let after_lang = after_fence.trim_start_matches(|c: char| c.is_alphanumeric() || c == '_');
        if let Some(end) = after_lang.find(fence) {
            let block = &after_lang[..end];
            if block.contains('{') {
                return balanced_object(block.trim());
            }
        }
    }

    balanced_object(trimmed)
}

/// The first brace-balanced object in `text`, quote-aware.
fn balanced_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + idx + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Drop `//` line comments outside string literals. Some models annotate
/// the JSON they were asked for.
pub fn strip_line_comments(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    action: Option<String>,
    target: Option<String>,
    #[serde(default)]
    value: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    achieved: Option<bool>,
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
}

fn parse_action_kind(raw: &str) -> Option<ActionKind> {
    match raw.trim().to_lowercase().as_str() {
        "click" => Some(ActionKind::Click),
        "type" => Some(ActionKind::Type),
        "scroll" => Some(ActionKind::Scroll),
        "navigate" => Some(ActionKind::Navigate),
        "wait" => Some(ActionKind::Wait),
        "extract" => Some(ActionKind::Extract),
        _ => None,
    }
}

/// Parse a model response into a plan. `None` on missing required fields
/// (`action`, `target`, `confidence`), unknown action, or junk structure.
pub fn parse_action_plan(raw: &str) -> Option<ActionPlan> {
    let object = extract_json_object(raw)?;
    let cleaned = strip_line_comments(&object);

    let parsed: RawPlan = match serde_json::from_str(&cleaned) {
        Ok(plan) => plan,
        Err(err) => {
            debug!(%err, "plan response is not valid json");
            return None;
        }
    };

    let action = parse_action_kind(parsed.action.as_deref()?)?;
    let target = parsed.target?;
    let confidence = parsed.confidence?;

    Some(ActionPlan {
        action,
        target,
        value: parsed.value,
        confidence: confidence.clamp(0.0, 1.0),
        reasoning: parsed.reasoning.unwrap_or_default(),
    })
}

/// Parse a goal-check response. `None` when `achieved` or `confidence`
/// is missing or the structure is junk.
pub fn parse_goal_verdict(raw: &str) -> Option<GoalVerdict> {
    let object = extract_json_object(raw)?;
    let cleaned = strip_line_comments(&object);

    let parsed: RawVerdict = match serde_json::from_str(&cleaned) {
        Ok(verdict) => verdict,
        Err(err) => {
            debug!(%err, "verdict response is not valid json");
            return None;
        }
    };

    Some(GoalVerdict {
        achieved: parsed.achieved?,
        confidence: parsed.confidence?.clamp(0.0, 1.0),
        reasoning: parsed.reasoning.unwrap_or_default(),
    })
}
