//! Text normalization and the weighted similarity sum.

use std::collections::BTreeSet;

use page_model::{ElementDescriptor, Viewport};

use crate::config::ResolverWeights;

/// Lowercase, punctuation to whitespace, whitespace runs collapsed.
/// Applied to both sides of every comparison.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tokens(normalized: &str) -> BTreeSet<&str> {
    normalized.split_whitespace().collect()
}

/// Jaccard similarity of normalized token sets; 0 when either is empty.
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let (ta, tb) = (tokens(a), tokens(b));
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    intersection as f64 / union as f64
}

/// Overlap coefficient of normalized token sets: shared tokens over the
/// smaller set. Rewards a partial match against long labels.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let (ta, tb) = (tokens(a), tokens(b));
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    intersection as f64 / ta.len().min(tb.len()) as f64
}

/// Plain normalized text similarity, used as the text half of the visual
/// fusion score.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    token_jaccard(&normalize(a), &normalize(b))
}

/// Breakdown of one element's weighted score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementScore {
    /// Full weighted sum, compared against the acceptance threshold.
    pub total: f64,
    /// The text-derived portion alone (match, containment, tokens, aria).
    pub text: f64,
}

/// Score one element against an already-normalized target.
pub fn score_element(
    normalized_target: &str,
    el: &ElementDescriptor,
    viewport: &Viewport,
    w: &ResolverWeights,
) -> ElementScore {
    if normalized_target.is_empty() {
        return ElementScore {
            total: 0.0,
            text: 0.0,
        };
    }

    let element_text = normalize(el.match_text());
    let mut text = 0.0;

    if element_text == normalized_target {
        text += w.exact_match;
    }
    if !element_text.is_empty()
        && (element_text.contains(normalized_target) || normalized_target.contains(&element_text))
    {
        text += w.contains_match;
    }
    text += w.token_jaccard * token_jaccard(normalized_target, &element_text);
    text += w.partial_overlap * token_overlap(normalized_target, &element_text);

    if let Some(aria) = &el.aria_label {
        if normalize(aria) == normalized_target {
            text += w.aria_label;
        }
    } else if is_generic_interactive_role(el.role.as_deref()) {
        text += w.aria_label * w.generic_role_credit;
    }

    let mut total = text;
    if el.clickable {
        total += w.clickable;
    }
    if el.visible {
        total += w.visible;
    }
    if el.interactive {
        total += w.interactive;
    }
    total += w.viewport_position * centering(el, viewport);

    ElementScore { total, text }
}

/// `1 − min(|center_y − viewport_center_y| / viewport_height, 1)`;
/// 0 for a degenerate viewport.
fn centering(el: &ElementDescriptor, viewport: &Viewport) -> f64 {
    if viewport.height <= 0.0 {
        return 0.0;
    }
    let offset = (el.bounds.center_y() - viewport.center_y()).abs();
    1.0 - (offset / viewport.height).min(1.0)
}

fn is_generic_interactive_role(role: Option<&str>) -> bool {
    matches!(role, Some("button") | Some("link") | Some("menuitem"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::ElementBounds;

    fn button(text: &str) -> ElementDescriptor {
        ElementDescriptor {
            tag: "button".into(),
            text: text.into(),
            bounds: ElementBounds::new(100.0, 480.0, 120.0, 40.0),
            visible: true,
            clickable: true,
            interactive: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_strips_case_and_punctuation() {
        assert_eq!(normalize(" Buy Now! "), "buy now");
        assert_eq!(normalize("buy   now"), "buy now");
        assert_eq!(normalize("???"), "");
    }

    #[test]
    fn test_scoring_is_case_and_punctuation_insensitive() {
        let viewport = Viewport {
            width: 1000.0,
            height: 1000.0,
        };
        let w = ResolverWeights::default();
        let el = button("buy now");

        let noisy = score_element(&normalize(" Buy Now! "), &el, &viewport, &w);
        let clean = score_element(&normalize("buy now"), &el, &viewport, &w);
        assert_eq!(noisy, clean);
    }

    #[test]
    fn test_exact_match_outranks_partial() {
        let viewport = Viewport {
            width: 1000.0,
            height: 1000.0,
        };
        let w = ResolverWeights::default();
        let target = normalize("buy now");

        let exact = score_element(&target, &button("Buy now"), &viewport, &w);
        let partial = score_element(&target, &button("Buy now with one click"), &viewport, &w);
        let unrelated = score_element(&target, &button("Contact us"), &viewport, &w);

        assert!(exact.total > partial.total);
        assert!(partial.total > unrelated.total);
        assert!(exact.text >= 0.9); // exact + contains + full token agreement
    }

    #[test]
    fn test_aria_label_exact_credit_and_role_credit() {
        let viewport = Viewport::default();
        let w = ResolverWeights::default();
        let target = normalize("search");

        let mut labeled = button("");
        labeled.aria_label = Some("Search".into());
        let labeled_score = score_element(&target, &labeled, &viewport, &w);

        let mut generic = button("");
        generic.role = Some("button".into());
        let generic_score = score_element(&target, &generic, &viewport, &w);

        assert!((labeled_score.text - w.aria_label).abs() < 1e-9);
        assert!((generic_score.text - w.aria_label * w.generic_role_credit).abs() < 1e-9);
    }

    #[test]
    fn test_empty_target_scores_zero() {
        let viewport = Viewport::default();
        let w = ResolverWeights::default();
        let score = score_element(&normalize("!!"), &button("Buy now"), &viewport, &w);
        assert_eq!(score.total, 0.0);
    }

    #[test]
    fn test_token_metrics() {
        assert!((token_jaccard("buy now", "buy now today") - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(token_overlap("buy now", "buy now today"), 1.0);
        assert_eq!(token_jaccard("", "anything"), 0.0);
    }
}
