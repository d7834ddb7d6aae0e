//! Fixture-backed page driver.
//!
//! A [`ReplayFixture`] maps URLs to canned page payloads: the structure
//! survey, the visible text, stability and load outcomes, and optional
//! per-script overrides. [`ReplayDriver`] serves the whole driver contract
//! from that file, so agent runs are reproducible without a browser.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use nav_control::ACTIVITY_QUERY_MARKER;
use page_driver::{PageDriver, ScreenshotSource};
use page_perceiver::SURVEY_MARKER;

/// One recorded page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageEntry {
    /// Payload answered to the structure survey script.
    pub survey: Value,
    /// Visible text answered to extraction scripts; falls back to the
    /// survey's `text` field when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// URL the page actually lands on (redirects, www canonicalization).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolves_to: Option<String>,
    /// Answer to the activity quiet-window query.
    pub stable: bool,
    pub load: LoadOutcome,
    /// Base64 PNG served to screenshot captures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_b64: Option<String>,
    /// Checked before the built-in answers; the first rule whose fragment
    /// appears in the script wins.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptRule>,
}

impl Default for PageEntry {
    fn default() -> Self {
        Self {
            survey: Value::Null,
            text: None,
            resolves_to: None,
            stable: true,
            load: LoadOutcome::Finished,
            screenshot_b64: None,
            scripts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptRule {
    pub contains: String,
    pub result: Value,
    /// Page the driver moves to after answering. Models scripts whose side
    /// effect is a navigation, like a form submit or a click handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goto: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    #[default]
    Finished,
    Failed,
    Timeout,
}

impl LoadOutcome {
    fn as_wait_result(self) -> Option<bool> {
        match self {
            LoadOutcome::Finished => Some(true),
            LoadOutcome::Failed => Some(false),
            LoadOutcome::Timeout => None,
        }
    }
}

/// A set of recorded pages plus the URL a session starts on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayFixture {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    pub pages: BTreeMap<String, PageEntry>,
}

impl ReplayFixture {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read replay fixture {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse replay fixture {}", path.display()))
    }

    /// Exact key match, then the trailing-slash variant.
    fn entry(&self, url: &str) -> Option<(&str, &PageEntry)> {
        if let Some((key, entry)) = self.pages.get_key_value(url) {
            return Some((key.as_str(), entry));
        }
        let variant = if let Some(stripped) = url.strip_suffix('/') {
            stripped.to_string()
        } else {
            format!("{url}/")
        };
        if let Some((key, entry)) = self.pages.get_key_value(&variant) {
            return Some((key.as_str(), entry));
        }
        // A page reached only through a redirect is keyed by its request
        // URL but looked up by the URL it resolved to.
        self.pages
            .iter()
            .find(|(_, entry)| entry.resolves_to.as_deref() == Some(url))
            .map(|(key, entry)| (key.as_str(), entry))
    }
}

/// `PageDriver` serving recorded pages from a [`ReplayFixture`].
pub struct ReplayDriver {
    fixture: ReplayFixture,
    url: Mutex<String>,
}

impl ReplayDriver {
    pub fn new(fixture: ReplayFixture) -> Self {
        Self {
            fixture,
            url: Mutex::new("about:blank".to_string()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(ReplayFixture::from_file(path)?))
    }

    /// The fixture's declared starting URL, if any.
    pub fn start_url(&self) -> Option<String> {
        self.fixture.start_url.clone()
    }

    fn current_entry(&self) -> Option<&PageEntry> {
        let url = self.url.lock().unwrap().clone();
        self.fixture.entry(&url).map(|(_, entry)| entry)
    }

    fn land_on(&self, url: &str) {
        let landed = match self.fixture.entry(url) {
            Some((key, entry)) => entry.resolves_to.clone().unwrap_or_else(|| key.to_string()),
            None => {
                debug!(target: "pagepilot::replay", url, "url not in fixture");
                url.to_string()
            }
        };
        *self.url.lock().unwrap() = landed;
    }
}

#[async_trait]
impl PageDriver for ReplayDriver {
    async fn navigate(&self, url: &str) {
        self.land_on(url);
    }

    async fn run_script(&self, code: &str) -> Option<Value> {
        let entry = self.current_entry();
        if let Some(entry) = entry {
            for rule in &entry.scripts {
                if code.contains(&rule.contains) {
                    if let Some(dest) = &rule.goto {
                        self.land_on(dest);
                    }
                    return Some(rule.result.clone());
                }
            }
        }
        if code.contains(SURVEY_MARKER) {
            return entry.map(|entry| entry.survey.clone());
        }
        if code.contains(ACTIVITY_QUERY_MARKER) {
            return Some(Value::Bool(entry.map(|entry| entry.stable).unwrap_or(true)));
        }
        if code.contains("innerText") {
            let text = entry.and_then(|entry| {
                entry.text.clone().or_else(|| {
                    entry
                        .survey
                        .get("text")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
            })?;
            return Some(Value::String(text));
        }
        // Recorded pages have no overlays to dismiss.
        if code.contains("overlaySelectors") {
            return Some(Value::Bool(false));
        }
        Some(Value::Bool(true))
    }

    async fn current_url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    async fn wait_load_finished(&self, _timeout: Duration) -> Option<bool> {
        self.current_entry()
            .map(|entry| entry.load.as_wait_result())
            .unwrap_or(Some(true))
    }
}

#[async_trait]
impl ScreenshotSource for ReplayDriver {
    async fn capture(&self) -> Option<Vec<u8>> {
        let encoded = self.current_entry()?.screenshot_b64.clone()?;
        match STANDARD.decode(encoded.as_bytes()) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(target: "pagepilot::replay", error = %err, "bad screenshot encoding");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> ReplayFixture {
        serde_json::from_value(json!({
            "start_url": "https://docs.example.org/",
            "pages": {
                "https://docs.example.org/": {
                    "survey": {
                        "url": "https://docs.example.org/",
                        "title": "Docs",
                        "text": "Welcome to the docs"
                    },
                    "scripts": [
                        { "contains": "#broken", "result": false }
                    ]
                },
                "https://github.com": {
                    "survey": { "url": "https://www.github.com/", "title": "GitHub" },
                    "resolves_to": "https://www.github.com/"
                }
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_serves_survey_for_known_url() {
        let driver = ReplayDriver::new(fixture());
        driver.navigate("https://docs.example.org/").await;

        let survey = driver.run_script(SURVEY_MARKER).await.unwrap();
        assert_eq!(survey["title"], "Docs");
        assert_eq!(driver.wait_load_finished(Duration::ZERO).await, Some(true));
    }

    #[tokio::test]
    async fn test_slash_variant_lookup() {
        let driver = ReplayDriver::new(fixture());
        driver.navigate("https://docs.example.org").await;
        assert_eq!(driver.current_url().await, "https://docs.example.org/");
    }

    #[tokio::test]
    async fn test_redirect_lands_on_resolved_url_and_stays_queryable() {
        let driver = ReplayDriver::new(fixture());
        driver.navigate("https://github.com").await;
        assert_eq!(driver.current_url().await, "https://www.github.com/");

        // The page is still found through its resolves_to alias.
        let survey = driver.run_script(SURVEY_MARKER).await.unwrap();
        assert_eq!(survey["title"], "GitHub");
    }

    #[tokio::test]
    async fn test_script_rules_override_builtins() {
        let driver = ReplayDriver::new(fixture());
        driver.navigate("https://docs.example.org/").await;

        let result = driver.run_script("document.querySelector(\"#broken\")").await;
        assert_eq!(result, Some(Value::Bool(false)));
        let result = driver.run_script("anything else").await;
        assert_eq!(result, Some(Value::Bool(true)));
    }

    #[tokio::test]
    async fn test_goto_rule_moves_the_page() {
        let mut fixture = fixture();
        fixture
            .pages
            .get_mut("https://docs.example.org/")
            .unwrap()
            .scripts
            .push(ScriptRule {
                contains: "form.submit".into(),
                result: Value::Bool(true),
                goto: Some("https://docs.example.org/search".into()),
            });
        fixture.pages.insert(
            "https://docs.example.org/search".into(),
            PageEntry {
                survey: json!({ "title": "Search results" }),
                ..PageEntry::default()
            },
        );
        let driver = ReplayDriver::new(fixture);
        driver.navigate("https://docs.example.org/").await;

        let result = driver.run_script("form.submit();").await;
        assert_eq!(result, Some(Value::Bool(true)));
        assert_eq!(
            driver.current_url().await,
            "https://docs.example.org/search"
        );
        let survey = driver.run_script(SURVEY_MARKER).await.unwrap();
        assert_eq!(survey["title"], "Search results");
    }

    #[tokio::test]
    async fn test_inner_text_falls_back_to_survey_text() {
        let driver = ReplayDriver::new(fixture());
        driver.navigate("https://docs.example.org/").await;

        let text = driver.run_script("document.body.innerText").await.unwrap();
        assert_eq!(text, Value::String("Welcome to the docs".to_string()));
    }

    #[tokio::test]
    async fn test_screenshots_come_from_the_fixture() {
        let mut fixture = fixture();
        fixture
            .pages
            .get_mut("https://docs.example.org/")
            .unwrap()
            .screenshot_b64 = Some(STANDARD.encode([1u8, 2, 3]));
        let driver = ReplayDriver::new(fixture);

        driver.navigate("https://docs.example.org/").await;
        assert_eq!(driver.capture().await, Some(vec![1, 2, 3]));
        driver.navigate("https://nowhere.test/").await;
        assert_eq!(driver.capture().await, None);
    }

    #[tokio::test]
    async fn test_unknown_url_surveys_nothing() {
        let driver = ReplayDriver::new(fixture());
        driver.navigate("https://nowhere.test/").await;
        assert_eq!(driver.run_script(SURVEY_MARKER).await, None);
        assert_eq!(
            driver.run_script(ACTIVITY_QUERY_MARKER).await,
            Some(Value::Bool(true))
        );
    }
}
