//! One-call analysis of an extracted page.

use serde::{Deserialize, Serialize};

use page_model::PageState;

use crate::links::most_relevant_link;
use crate::query::{clean_query, QueryOptimizer};
use crate::results::{results_from_state, ResultAnalyzer, ScoredResult};
use crate::sections::{ContentProcessor, PageSections};
use crate::synthesize::{SynthesisSummary, Synthesizer};

const TOP_RESULTS: usize = 5;

/// What an extract pass over one page produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentReport {
    pub url: String,
    pub title: String,
    pub sections: PageSections,
    /// Result-shaped links on the page, best first.
    pub top_results: Vec<ScoredResult>,
    /// A reshaped query, present only when adaptation changed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_query: Option<String>,
    /// The linked element whose URL best matches the goal, when any does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<LinkHint>,
    pub summary: SynthesisSummary,
}

/// An onward link worth following, picked by URL-path relevance to the goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkHint {
    pub text: String,
    pub href: String,
    pub score: f64,
}

/// Run the full insight pipeline over one page: section the text, rank any
/// result links against the goal, suggest a reshaped query when the links
/// warrant it, pick the most promising onward link, and fold everything into
/// a synthesis summary.
///
/// `raw_text` is the line-preserving page text when the caller has one; the
/// whitespace-collapsed snapshot text is the fallback.
pub fn analyze_page(goal: &str, state: &PageState, raw_text: Option<&str>) -> ContentReport {
    let text = raw_text.unwrap_or(&state.visible_text);
    let sections = ContentProcessor::new().process(text);

    let query = clean_query(goal);
    let results = results_from_state(state);
    let mut top_results = ResultAnalyzer::new().rank(&results, &query);
    top_results.truncate(TOP_RESULTS);

    let suggested = QueryOptimizer::new().adapt_to_results(&query, &results);
    let suggested_query = (suggested != query).then_some(suggested);

    let next_link = most_relevant_link(&state.navigation_elements, &query)
        .into_iter()
        .chain(most_relevant_link(&state.interactive_elements, &query))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(element, score)| LinkHint {
            text: element.text.clone(),
            href: element.href.clone().unwrap_or_default(),
            score,
        });

    let mut synthesizer = Synthesizer::new();
    synthesizer.add_source(&state.url, text, &sections);
    if let Some(main) = &state.main_content {
        if !main.text.is_empty() {
            synthesizer.add_source(&state.url, &main.text, &PageSections::default());
        }
    }

    ContentReport {
        url: state.url.clone(),
        title: state.title.clone(),
        sections,
        top_results,
        suggested_query,
        next_link,
        summary: synthesizer.summary(),
    }
}
