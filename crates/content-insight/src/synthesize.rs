//! Merging extracts from several pages into one deduplicated summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::sections::PageSections;

/// Topics a complete piece of technical documentation is expected to cover.
pub const EXPECTED_TOPICS: &[&str] = &[
    "Installation",
    "Usage",
    "Configuration",
    "Examples",
    "API",
    "Testing",
];

/// Two code blocks closer than this are treated as the same example.
const CODE_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Paragraph identity is the normalized prefix of this many characters.
const PREFIX_CHARS: usize = 50;

/// One deduplicated paragraph and the page it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedParagraph {
    pub text: String,
    pub source: String,
}

/// The merged view over every source fed to the synthesizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisSummary {
    pub paragraphs: Vec<SourcedParagraph>,
    pub code_examples: Vec<String>,
    pub references: Vec<String>,
    pub covered_topics: Vec<String>,
    pub missing_topics: Vec<String>,
    pub sources: usize,
}

/// Accumulates page extracts, dropping near-duplicate paragraphs and code.
#[derive(Debug, Default)]
pub struct Synthesizer {
    seen_prefixes: BTreeSet<String>,
    paragraphs: Vec<SourcedParagraph>,
    code: Vec<String>,
    references: Vec<String>,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one page's text and processed sections into the running merge.
    pub fn add_source(&mut self, url: &str, text: &str, sections: &PageSections) {
        let mut added = 0usize;
        for paragraph in paragraphs_of(text) {
            let key = prefix_key(paragraph);
            if key.is_empty() || !self.seen_prefixes.insert(key) {
                continue;
            }
            self.paragraphs.push(SourcedParagraph {
                text: paragraph.to_string(),
                source: url.to_string(),
            });
            added += 1;
        }

        for block in &sections.code_blocks {
            if !self.has_similar_code(block) {
                self.code.push(block.clone());
            }
        }

        if !url.is_empty() && !self.references.iter().any(|r| r == url) {
            self.references.push(url.to_string());
        }
        debug!(url, added, "merged source into synthesis");
    }

    pub fn summary(&self) -> SynthesisSummary {
        let words = word_set(
            self.paragraphs
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .as_str(),
        );

        let mut covered = Vec::new();
        let mut missing = Vec::new();
        for topic in EXPECTED_TOPICS {
            if words.contains(&topic.to_lowercase()) {
                covered.push(topic.to_string());
            } else {
                missing.push(topic.to_string());
            }
        }

        SynthesisSummary {
            paragraphs: self.paragraphs.clone(),
            code_examples: self.code.clone(),
            references: self.references.clone(),
            covered_topics: covered,
            missing_topics: missing,
            sources: self.references.len(),
        }
    }

    fn has_similar_code(&self, block: &str) -> bool {
        self.code
            .iter()
            .any(|existing| strsim::normalized_levenshtein(existing, block) > CODE_SIMILARITY_THRESHOLD)
    }
}

fn paragraphs_of(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

fn prefix_key(paragraph: &str) -> String {
    paragraph
        .trim()
        .to_lowercase()
        .chars()
        .take(PREFIX_CHARS)
        .collect()
}

fn word_set(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::ContentProcessor;

    #[test]
    fn test_duplicate_paragraphs_kept_once() {
        let mut synth = Synthesizer::new();
        let sections = PageSections::default();
        synth.add_source("https://a.test", "Shared intro paragraph.", &sections);
        synth.add_source("https://b.test", "  SHARED intro paragraph.  ", &sections);
        synth.add_source("https://b.test", "A different paragraph.", &sections);

        let summary = synth.summary();
        assert_eq!(summary.paragraphs.len(), 2);
        assert_eq!(summary.paragraphs[0].source, "https://a.test");
        assert_eq!(summary.references.len(), 2);
        assert_eq!(summary.sources, 2);
    }

    #[test]
    fn test_near_duplicate_code_dropped() {
        let mut synth = Synthesizer::new();
        let a = ContentProcessor::new().process("```\nlet total = items.iter().sum();\n```");
        let b = ContentProcessor::new().process("```\nlet total = item.iter().sum();\n```");
        let c = ContentProcessor::new().process("```\nprintln!(\"hello\");\n```");

        synth.add_source("https://a.test", "", &a);
        synth.add_source("https://b.test", "", &b);
        synth.add_source("https://c.test", "", &c);

        let summary = synth.summary();
        assert_eq!(summary.code_examples.len(), 2);
    }

    #[test]
    fn test_topic_coverage_whole_words() {
        let mut synth = Synthesizer::new();
        let sections = PageSections::default();
        synth.add_source(
            "https://docs.test",
            "Installation steps and usage notes.\n\nRapid iteration tips.",
            &sections,
        );

        let summary = synth.summary();
        assert!(summary.covered_topics.contains(&"Installation".to_string()));
        assert!(summary.covered_topics.contains(&"Usage".to_string()));
        // "Rapid" must not count as the API topic.
        assert!(summary.missing_topics.contains(&"API".to_string()));
        assert!(summary.missing_topics.contains(&"Testing".to_string()));
    }
}
