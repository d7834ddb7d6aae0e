//! Slicing page text into structured pieces.
//!
//! Works on plain extracted text with line structure preserved: fenced
//! code blocks, short title-like lines opening sections, version strings
//! and numbered tutorial steps.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FENCED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static FENCE_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\w*\n?").unwrap());
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"v?\d+\.\d+(\.\d+)?").unwrap());
static STEP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:step\s+)?(\d{1,3})[.):]\s+(\S.*)$").unwrap());

const MAX_HEADING_CHARS: usize = 60;
const MAX_HEADING_WORDS: usize = 6;

/// One titled slice of the page text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

/// A numbered instruction extracted from tutorial-style text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialStep {
    pub number: u32,
    pub text: String,
}

/// Everything the processor pulls out of one page's text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSections {
    #[serde(default)]
    pub code_blocks: Vec<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub steps: Vec<TutorialStep>,
}

impl PageSections {
    pub fn is_empty(&self) -> bool {
        self.code_blocks.is_empty()
            && self.sections.is_empty()
            && self.versions.is_empty()
            && self.steps.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ContentProcessor;

impl ContentProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, text: &str) -> PageSections {
        PageSections {
            code_blocks: extract_code_blocks(text),
            sections: split_sections(text),
            versions: extract_versions(text),
            steps: extract_steps(text),
        }
    }
}

fn extract_code_blocks(text: &str) -> Vec<String> {
    FENCED_BLOCK_RE
        .find_iter(text)
        .map(|m| clean_code_block(m.as_str()))
        .filter(|block| !block.is_empty())
        .collect()
}

fn clean_code_block(block: &str) -> String {
    FENCE_MARKER_RE.replace_all(block, "").trim().to_string()
}

/// A line reads as a heading when it is short, has few words, carries no
/// sentence punctuation and opens with an uppercase letter.
fn is_heading(line: &str) -> bool {
    let line = line.trim();
    if line.len() < 2 || line.len() > MAX_HEADING_CHARS {
        return false;
    }
    if line.split_whitespace().count() > MAX_HEADING_WORDS {
        return false;
    }
    if line.contains(['.', '!', '?', ',', ';', ':']) {
        return false;
    }
    if STEP_RE.is_match(line) {
        return false;
    }
    match line.chars().find(|c| c.is_alphabetic()) {
        Some(first) => first.is_uppercase(),
        None => false,
    }
}

fn split_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_heading(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section {
                title: line.to_string(),
                body: String::new(),
            });
        } else if let Some(section) = current.as_mut() {
            if !section.body.is_empty() {
                section.body.push(' ');
            }
            section.body.push_str(line);
        }
    }
    if let Some(section) = current {
        sections.push(section);
    }
    sections
}

fn extract_versions(text: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    VERSION_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn extract_steps(text: &str) -> Vec<TutorialStep> {
    STEP_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let number = caps.get(1)?.as_str().parse().ok()?;
            let text = caps.get(2)?.as_str().trim().to_string();
            Some(TutorialStep { number, text })
        })
        .collect()
}
