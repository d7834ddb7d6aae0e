//! In-memory collaborator doubles for offline tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{ObjectDetector, PageDriver, ProgressSink, ScreenshotSource};
use page_model::Detection;

type ScriptHandler = dyn Fn(&str) -> Option<Value> + Send + Sync;
type NavigateMap = dyn Fn(&str) -> String + Send + Sync;

/// A `PageDriver` driven entirely by a script handler closure and a queue
/// of load outcomes. Records every navigation and script for assertions.
pub struct ScriptedDriver {
    handler: Box<ScriptHandler>,
    navigate_map: Box<NavigateMap>,
    load_results: Mutex<VecDeque<Option<bool>>>,
    url: Mutex<String>,
    navigations: Mutex<Vec<String>>,
    scripts: Mutex<Vec<String>>,
}

impl ScriptedDriver {
    /// A driver where every script evaluates to `true` and every load
    /// succeeds. Customize with the builder methods.
    pub fn new() -> Self {
        Self {
            handler: Box::new(|_| Some(Value::Bool(true))),
            navigate_map: Box::new(|url| url.to_string()),
            load_results: Mutex::new(VecDeque::new()),
            url: Mutex::new(String::from("about:blank")),
            navigations: Mutex::new(Vec::new()),
            scripts: Mutex::new(Vec::new()),
        }
    }

    /// Answer scripts through `handler`; return `None` to simulate a
    /// script timeout or error.
    pub fn with_script_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.handler = Box::new(handler);
        self
    }

    /// Map a requested navigation URL to the URL the page ends up on
    /// (redirects, www canonicalization, error pages).
    pub fn with_navigate_map<F>(mut self, map: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.navigate_map = Box::new(map);
        self
    }

    /// Queue the outcome of the next `wait_load_finished` call; `None`
    /// simulates a timeout. An empty queue reports success.
    pub fn push_load_result(&self, result: Option<bool>) {
        self.load_results.lock().unwrap().push_back(result);
    }

    pub fn set_url(&self, url: impl Into<String>) {
        *self.url.lock().unwrap() = url.into();
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    /// How many recorded scripts contain `fragment`.
    pub fn scripts_containing(&self, fragment: &str) -> usize {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.contains(fragment))
            .count()
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn navigate(&self, url: &str) {
        self.navigations.lock().unwrap().push(url.to_string());
        *self.url.lock().unwrap() = (self.navigate_map)(url);
    }

    async fn run_script(&self, code: &str) -> Option<Value> {
        self.scripts.lock().unwrap().push(code.to_string());
        (self.handler)(code)
    }

    async fn current_url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    async fn wait_load_finished(&self, _timeout: Duration) -> Option<bool> {
        self.load_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Some(true))
    }
}

/// Screenshot source returning a fixed byte payload.
pub struct FixedScreenshot(pub Option<Vec<u8>>);

#[async_trait]
impl ScreenshotSource for FixedScreenshot {
    async fn capture(&self) -> Option<Vec<u8>> {
        self.0.clone()
    }
}

/// Detector returning a fixed detection list.
pub struct FixedDetector(pub Vec<Detection>);

#[async_trait]
impl ObjectDetector for FixedDetector {
    async fn detect(&self, _image: &[u8]) -> Vec<Detection> {
        self.0.clone()
    }
}

/// Progress sink that keeps every emitted line for assertions.
#[derive(Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_driver_records_activity() {
        let driver = ScriptedDriver::new()
            .with_navigate_map(|url| format!("{url}/landed"));
        driver.navigate("https://a.test").await;
        assert_eq!(driver.current_url().await, "https://a.test/landed");

        driver.run_script("return 1 + 1;").await;
        assert_eq!(driver.navigations(), vec!["https://a.test"]);
        assert_eq!(driver.scripts_containing("1 + 1"), 1);
    }

    #[tokio::test]
    async fn test_load_queue_defaults_to_success() {
        let driver = ScriptedDriver::new();
        driver.push_load_result(None);
        driver.push_load_result(Some(false));

        assert_eq!(driver.wait_load_finished(Duration::ZERO).await, None);
        assert_eq!(driver.wait_load_finished(Duration::ZERO).await, Some(false));
        assert_eq!(driver.wait_load_finished(Duration::ZERO).await, Some(true));
    }
}
