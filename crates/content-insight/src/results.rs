//! Search result scoring.
//!
//! A result's worth is a weighted blend of where it comes from (domain
//! authority), how well its text matches the query (title hits count 1.5x
//! over snippet hits), and how recent it looks (bare year mentions).

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use page_model::PageState;

use crate::query::query_terms;

/// Hosts with known-good content; anything else scores the default.
const DOMAIN_AUTHORITY: &[(&str, f64)] = &[
    ("github.com", 0.9),
    ("stackoverflow.com", 0.85),
    ("docs.python.org", 0.95),
    ("developer.mozilla.org", 0.95),
];

const DEFAULT_AUTHORITY: f64 = 0.5;

const DOMAIN_WEIGHT: f64 = 0.3;
const RELEVANCE_WEIGHT: f64 = 0.5;
const FRESHNESS_WEIGHT: f64 = 0.2;

/// One link harvested from a results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

/// A result with its computed score, ready for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub result: SearchResult,
    pub score: f64,
}

/// Query/text overlap on cleaned token sets; title matches outweigh
/// snippet matches 1.5x, capped at 1.0.
pub fn query_relevance(query: &str, title: &str, snippet: &str) -> f64 {
    let terms = query_terms(query);
    if terms.is_empty() {
        return 0.0;
    }
    let title_terms = query_terms(title);
    let snippet_terms = query_terms(snippet);

    let title_hits = terms.intersection(&title_terms).count() as f64;
    let snippet_hits = terms.intersection(&snippet_terms).count() as f64;
    let total = terms.len() as f64;

    let title_score = title_hits / total * 1.5;
    let snippet_score = snippet_hits / total;
    title_score.max(snippet_score).min(1.0)
}

#[derive(Debug, Default)]
pub struct ResultAnalyzer;

impl ResultAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Authority of the result's host, matching table entries exactly or
    /// as a parent domain of the actual host.
    pub fn domain_score(&self, raw_url: &str) -> f64 {
        let host = match Url::parse(raw_url) {
            Ok(url) => match url.host_str() {
                Some(host) => host.to_lowercase(),
                None => return DEFAULT_AUTHORITY,
            },
            Err(_) => return DEFAULT_AUTHORITY,
        };
        let host = host.strip_prefix("www.").unwrap_or(&host);

        for (domain, score) in DOMAIN_AUTHORITY {
            if host == *domain || host.ends_with(&format!(".{domain}")) {
                return *score;
            }
        }
        DEFAULT_AUTHORITY
    }

    /// Year mentions as a recency proxy: this or last year 1.0, the year
    /// before 0.7, anything else 0.3.
    pub fn freshness_score(&self, text: &str) -> f64 {
        let year = Utc::now().year();
        if text.contains(&year.to_string()) || text.contains(&(year - 1).to_string()) {
            1.0
        } else if text.contains(&(year - 2).to_string()) {
            0.7
        } else {
            0.3
        }
    }

    pub fn score(&self, result: &SearchResult, query: &str) -> f64 {
        let text = format!("{} {}", result.title, result.snippet);
        DOMAIN_WEIGHT * self.domain_score(&result.url)
            + RELEVANCE_WEIGHT * query_relevance(query, &result.title, &result.snippet)
            + FRESHNESS_WEIGHT * self.freshness_score(&text)
    }

    /// Score and sort descending; equal scores keep their original order.
    pub fn rank(&self, results: &[SearchResult], query: &str) -> Vec<ScoredResult> {
        let mut scored: Vec<ScoredResult> = results
            .iter()
            .map(|result| ScoredResult {
                result: result.clone(),
                score: self.score(result, query),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    /// The single most promising result, if any.
    pub fn best<'a>(&self, results: &'a [SearchResult], query: &str) -> Option<&'a SearchResult> {
        let mut best: Option<(&SearchResult, f64)> = None;
        for result in results {
            let score = self.score(result, query);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((result, score));
            }
        }
        best.map(|(result, _)| result)
    }
}

/// Harvest result-shaped links from an extracted page: any element with a
/// non-empty href and link text becomes a candidate result.
pub fn results_from_state(state: &PageState) -> Vec<SearchResult> {
    let mut seen = std::collections::BTreeSet::new();
    let mut results = Vec::new();
    for element in state.candidates() {
        let href = match &element.href {
            Some(href) if !href.is_empty() => href.clone(),
            _ => continue,
        };
        if element.text.is_empty() || !seen.insert(href.clone()) {
            continue;
        }
        results.push(SearchResult {
            url: href,
            title: element.text.clone(),
            snippet: element.aria_label.clone().unwrap_or_default(),
        });
    }
    results
}
