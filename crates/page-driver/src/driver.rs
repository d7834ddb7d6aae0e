//! Collaborator traits.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use page_model::Detection;

/// The rendering engine / page object.
///
/// One logical owner drives this at a time; the orchestrator awaits each
/// call to completion before issuing the next.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Ask the engine to start loading `url`. Completion is reported
    /// separately through [`wait_load_finished`](Self::wait_load_finished).
    async fn navigate(&self, url: &str);

    /// Evaluate a script in the page. `None` on execution error or
    /// engine-side timeout.
    async fn run_script(&self, code: &str) -> Option<Value>;

    async fn current_url(&self) -> String;

    /// Await the engine's load-finished notification for the most recent
    /// navigation. `Some(ok)` carries the engine's success flag; `None`
    /// means `timeout` elapsed without a notification.
    async fn wait_load_finished(&self, timeout: Duration) -> Option<bool>;
}

/// Screenshot capture collaborator.
#[async_trait]
pub trait ScreenshotSource: Send + Sync {
    /// Encoded image bytes of the current page, `None` if capture failed.
    async fn capture(&self) -> Option<Vec<u8>>;
}

/// Object-detection collaborator. May be absent entirely; resolution then
/// runs text-only.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Detected boxes for `image`; empty on inference failure.
    async fn detect(&self, image: &[u8]) -> Vec<Detection>;
}

/// Sink for the human-readable reasoning/execution lines streamed to the
/// user surface.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Default sink: forward progress lines to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, line: &str) {
        info!(target: "pagepilot::progress", "{line}");
    }
}
