//! Relevance scoring for navigation links.
//!
//! A link is promising when its URL path segments mention the target terms
//! and the path is not buried deep in the site hierarchy.

use page_model::ElementDescriptor;
use url::Url;

/// Path segments with no information content.
const SKIP_SEGMENTS: &[&str] = &["index", "html", "php"];

const DEPTH_PENALTY: f64 = 0.1;

/// Score a href against target terms: fraction of path segments containing
/// any target term, minus a depth penalty, clamped to [0, 1].
pub fn link_relevance(href: &str, target: &str) -> f64 {
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        // Relative href: take it as a bare path, dropping query/fragment.
        Err(_) => href
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segments: Vec<String> = path
        .to_lowercase()
        .split('/')
        .filter(|s| !s.is_empty() && !SKIP_SEGMENTS.contains(s))
        .map(String::from)
        .collect();
    if segments.is_empty() {
        return 0.0;
    }

    let target_words: Vec<String> = target
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();
    if target_words.is_empty() {
        return 0.0;
    }

    let matching = segments
        .iter()
        .filter(|segment| target_words.iter().any(|word| segment.contains(word)))
        .count() as f64;

    let fraction = matching / segments.len() as f64;
    (fraction - DEPTH_PENALTY * segments.len() as f64).clamp(0.0, 1.0)
}

/// The navigation element whose href best matches the target, when any
/// scores above zero. Document order wins ties.
pub fn most_relevant_link<'a>(
    elements: &'a [ElementDescriptor],
    target: &str,
) -> Option<(&'a ElementDescriptor, f64)> {
    let mut best: Option<(&ElementDescriptor, f64)> = None;
    for element in elements {
        let href = match &element.href {
            Some(href) => href,
            None => continue,
        };
        let score = link_relevance(href, target);
        if score > 0.0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((element, score));
        }
    }
    best
}

/// Linked elements ordered by descending relevance, capped at `limit`,
/// zero-scored links dropped.
pub fn ranked_links<'a>(
    elements: &'a [ElementDescriptor],
    target: &str,
    limit: usize,
) -> Vec<(&'a ElementDescriptor, f64)> {
    let mut scored: Vec<(&ElementDescriptor, f64)> = elements
        .iter()
        .filter_map(|element| {
            let href = element.href.as_deref()?;
            let score = link_relevance(href, target);
            (score > 0.0).then_some((element, score))
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
