//! Search query shaping.
//!
//! Queries are cleaned of filler words, enriched with context the goal
//! already implies (version, skill level, framework, language), and adapted
//! once result quality is known: broadened when results miss the mark,
//! narrowed when they are uniformly on target.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::results::{query_relevance, SearchResult};

/// Filler words dropped from every query.
const NOISE_WORDS: &[&str] = &[
    "how", "to", "what", "is", "are", "the", "in", "on", "at", "for", "with", "by", "from", "up",
    "about", "into", "over", "after",
];

/// Keyword groups recognised as already-present context.
const CONTEXT_KEYWORDS: &[(&str, &[&str])] = &[
    ("version", &["version", "v", "release"]),
    ("skill_level", &["beginner", "intermediate", "advanced"]),
    (
        "framework",
        &["django", "flask", "fastapi", "react", "vue", "angular"],
    ),
    (
        "language",
        &["python", "javascript", "typescript", "java", "c++"],
    ),
];

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"v?\d+\.\d+(\.\d+)?").unwrap());
static TECHNICAL_TERM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-zA-Z]*\b").unwrap());

/// Relevance below which the result set is considered off target.
const BROADEN_BELOW: f64 = 0.3;
/// Relevance above which the query can afford to get more specific.
const NARROW_ABOVE: f64 = 0.8;

/// Context hints carried alongside a goal, used to enrich a bare query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryContext {
    pub version: Option<String>,
    pub skill_level: Option<String>,
    pub framework: Option<String>,
    pub language: Option<String>,
}

/// Lowercase, drop noise words, strip punctuation per token.
pub fn clean_query(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| !NOISE_WORDS.contains(word))
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Token set of a cleaned query.
pub fn query_terms(query: &str) -> BTreeSet<String> {
    clean_query(query).split_whitespace().map(String::from).collect()
}

#[derive(Debug, Default)]
pub struct QueryOptimizer;

impl QueryOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Clean the base query and append whichever context hints the query
    /// does not already carry.
    pub fn enhance_query(&self, base_query: &str, context: &QueryContext) -> String {
        let existing = detect_context(base_query);
        let mut extra = Vec::new();

        if let Some(version) = &context.version {
            if !existing.contains_key("version") {
                if version.starts_with('v') {
                    extra.push(version.clone());
                } else {
                    extra.push(format!("v{version}"));
                }
            }
        }
        if let Some(level) = &context.skill_level {
            if !existing.contains_key("skill_level") {
                extra.push(level.clone());
            }
        }
        if let Some(framework) = &context.framework {
            if !existing.contains_key("framework") {
                extra.push(framework.clone());
            }
        }
        if let Some(language) = &context.language {
            if !existing.contains_key("language") {
                extra.push(language.clone());
            }
        }

        let cleaned = clean_query(base_query);
        if extra.is_empty() {
            cleaned
        } else {
            format!("{cleaned} {}", extra.join(" "))
        }
    }

    /// Adjust a query based on how well the current results match it.
    /// Low average relevance broadens, high narrows, middling quality
    /// appends up to two aspect terms the results agree on.
    pub fn adapt_to_results(&self, query: &str, results: &[SearchResult]) -> String {
        if results.is_empty() {
            return query.to_string();
        }

        let avg: f64 = results
            .iter()
            .map(|r| query_relevance(query, &r.title, &r.snippet))
            .sum::<f64>()
            / results.len() as f64;

        if avg < BROADEN_BELOW {
            let broadened = broaden_query(query);
            debug!(avg, %broadened, "results off target, broadening query");
            return broadened;
        }
        if avg > NARROW_ABOVE {
            let narrowed = narrow_query(query);
            debug!(avg, %narrowed, "results uniformly relevant, narrowing query");
            return narrowed;
        }

        let missing = missing_aspects(query, results);
        if missing.is_empty() {
            query.to_string()
        } else {
            format!("{query} {}", missing.join(" "))
        }
    }
}

fn detect_context(query: &str) -> BTreeMap<&'static str, String> {
    let mut found = BTreeMap::new();
    let lowered = query.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    for (kind, keywords) in CONTEXT_KEYWORDS {
        if let Some(word) = words.iter().find(|w| keywords.contains(w)) {
            found.insert(*kind, word.to_string());
        }
    }
    if let Some(m) = VERSION_RE.find(query) {
        found.insert("version", m.as_str().to_string());
    }
    found
}

/// Keep the first two core terms, dropping quoted constraints and version pins.
fn broaden_query(query: &str) -> String {
    query
        .split_whitespace()
        .filter(|w| !w.contains(['[', ']', '(', ')', ':', '"', '\'']))
        .filter(|w| !VERSION_RE.is_match(w))
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote technical terms and the most name-like bigram to force exact matches.
fn narrow_query(query: &str) -> String {
    let mut qualifiers: Vec<String> = TECHNICAL_TERM_RE
        .find_iter(query)
        .map(|m| format!("\"{}\"", m.as_str()))
        .collect();

    let words: Vec<&str> = query.split_whitespace().collect();
    if words.len() > 2 {
        let best = words
            .windows(2)
            .map(|pair| pair.join(" "))
            .max_by_key(|phrase| phrase.chars().filter(|c| c.is_uppercase()).count());
        if let Some(phrase) = best {
            qualifiers.push(format!("\"{phrase}\""));
        }
    }

    if qualifiers.is_empty() {
        query.to_string()
    } else {
        format!("{query} {}", qualifiers.join(" "))
    }
}

/// Terms most results agree on that the query does not mention yet,
/// ordered by similarity to the query, capped at two.
fn missing_aspects(query: &str, results: &[SearchResult]) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for result in results {
        for term in query_terms(&format!("{} {}", result.title, result.snippet)) {
            *counts.entry(term).or_default() += 1;
        }
    }

    let own = query_terms(query);
    let threshold = (results.len() / 2).max(1);
    let mut aspects: Vec<String> = counts
        .into_iter()
        .filter(|(term, count)| *count >= threshold && !own.contains(term))
        .map(|(term, _)| term)
        .collect();

    let lowered = query.to_lowercase();
    aspects.sort_by(|a, b| {
        let sa = strsim::normalized_levenshtein(a, &lowered);
        let sb = strsim::normalized_levenshtein(b, &lowered);
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });
    aspects.truncate(2);
    aspects
}
