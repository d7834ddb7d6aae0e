//! Heuristics over extracted page content.
//!
//! Everything in this crate is pure and offline: shaping search queries,
//! ranking result links, scoring navigation targets, slicing visible text
//! into sections, and merging extracts from several pages into one summary.

pub mod links;
pub mod query;
pub mod report;
pub mod results;
pub mod sections;
pub mod synthesize;

pub use links::{link_relevance, most_relevant_link, ranked_links};
pub use query::{QueryContext, QueryOptimizer};
pub use report::{analyze_page, ContentReport, LinkHint};
pub use results::{results_from_state, ResultAnalyzer, ScoredResult, SearchResult};
pub use sections::{ContentProcessor, PageSections, Section, TutorialStep};
pub use synthesize::{SynthesisSummary, Synthesizer, EXPECTED_TOPICS};
