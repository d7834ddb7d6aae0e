//! Between-attempt page recovery.
//!
//! Before a task retry the page is often in a degraded state: an error
//! overlay in the way, or a hung document. Recovery probes responsiveness,
//! dismisses common overlays, and reloads as the last resort.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use page_driver::PageDriver;

const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Cheapest possible script; any reply at all means the page executes JS.
const RESPONSIVE_PROBE_JS: &str = "(function() { return true; })()";

/// Find a visible error/modal overlay and click its close control.
/// Returns whether anything was dismissed.
pub const DISMISS_OVERLAYS_JS: &str = r#"
(function() {
    const overlaySelectors = [
        '[role="alert"]',
        '.error-dialog',
        '#error-modal',
        '[class*="error"]',
        '[class*="modal"]'
    ];
    for (const selector of overlaySelectors) {
        const overlay = document.querySelector(selector);
        if (overlay && overlay.offsetParent !== null) {
            const close = overlay.querySelector('button, [aria-label*="close" i]');
            if (close) {
                close.click();
                return true;
            }
        }
    }
    return false;
})()
"#;

pub struct PageRecovery {
    driver: Arc<dyn PageDriver>,
    reload_timeout: Duration,
}

impl PageRecovery {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            reload_timeout: DEFAULT_RELOAD_TIMEOUT,
        }
    }

    pub fn with_reload_timeout(mut self, timeout: Duration) -> Self {
        self.reload_timeout = timeout;
        self
    }

    pub async fn is_responsive(&self) -> bool {
        matches!(
            self.driver.run_script(RESPONSIVE_PROBE_JS).await,
            Some(Value::Bool(true))
        )
    }

    /// True when an overlay was found and dismissed.
    pub async fn dismiss_overlays(&self) -> bool {
        matches!(
            self.driver.run_script(DISMISS_OVERLAYS_JS).await,
            Some(Value::Bool(true))
        )
    }

    /// Best-effort recovery between task attempts. Returns whether the
    /// page looks usable afterward.
    pub async fn recover(&self) -> bool {
        if self.is_responsive().await {
            if self.dismiss_overlays().await {
                debug!("dismissed an error overlay");
            }
            return true;
        }

        let url = self.driver.current_url().await;
        warn!(%url, "page unresponsive, reloading");
        self.driver.navigate(&url).await;
        if self.driver.wait_load_finished(self.reload_timeout).await != Some(true) {
            return false;
        }
        self.is_responsive().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use page_driver::testing::ScriptedDriver;

    #[tokio::test]
    async fn test_responsive_page_needs_no_reload() {
        let driver = Arc::new(ScriptedDriver::new().with_script_handler(|code| {
            if code.contains("overlaySelectors") {
                Some(Value::Bool(false))
            } else {
                Some(Value::Bool(true))
            }
        }));
        let recovery = PageRecovery::new(driver.clone());

        assert!(recovery.recover().await);
        assert!(driver.navigations().is_empty());
        assert_eq!(driver.scripts_containing("overlaySelectors"), 1);
    }

    #[tokio::test]
    async fn test_unresponsive_page_reloads_current_url() {
        let driver = Arc::new(ScriptedDriver::new().with_script_handler(|_| None));
        driver.set_url("https://x.test/stuck");
        let recovery =
            PageRecovery::new(driver.clone()).with_reload_timeout(Duration::from_millis(10));

        // The reload goes through, but the page still answers nothing.
        assert!(!recovery.recover().await);
        assert_eq!(driver.navigations(), vec!["https://x.test/stuck"]);
    }

    #[tokio::test]
    async fn test_reload_can_bring_page_back() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let driver = Arc::new(ScriptedDriver::new().with_script_handler(move |_| {
            // First probe fails, everything after the reload answers.
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                None
            } else {
                Some(Value::Bool(true))
            }
        }));
        driver.set_url("https://x.test/");
        let recovery =
            PageRecovery::new(driver.clone()).with_reload_timeout(Duration::from_millis(10));

        assert!(recovery.recover().await);
        assert_eq!(driver.navigations().len(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_reports_overlay_hit() {
        let driver = Arc::new(ScriptedDriver::new());
        let recovery = PageRecovery::new(driver.clone());
        assert!(recovery.dismiss_overlays().await);
        assert_eq!(driver.scripts_containing("[role=\"alert\"]"), 1);
    }
}
