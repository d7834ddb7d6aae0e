//! Page-quiescence detection.
//!
//! An in-page probe records the timestamp of every DOM mutation, outgoing
//! fetch and user interaction. The page counts as stable once the newest
//! of those timestamps is older than the quiet window. The comparison
//! runs inside the page so only one clock is involved.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use page_driver::{poll_until, PageDriver};

use crate::config::NavConfig;

/// Marker present in every activity query script.
pub const ACTIVITY_QUERY_MARKER: &str = "__pagepilotActivityQuery";

/// Installs the activity listeners once per page; guarded so repeated
/// installation is a no-op.
pub const ACTIVITY_PROBE_JS: &str = r#"
(function __pagepilotProbe() {
    if (window.__pagepilotProbeInstalled) return true;
    window.__pagepilotProbeInstalled = true;
    window.__pagepilotLastMutation = Date.now();
    window.__pagepilotLastRequest = 0;
    window.__pagepilotLastInteraction = 0;

    try {
        var observer = new MutationObserver(function () {
            window.__pagepilotLastMutation = Date.now();
        });
        observer.observe(document.documentElement || document, {
            childList: true, subtree: true, attributes: true, characterData: true
        });
    } catch (e) {}

    try {
        var originalFetch = window.fetch;
        if (originalFetch) {
            window.fetch = function () {
                window.__pagepilotLastRequest = Date.now();
                return originalFetch.apply(this, arguments);
            };
        }
    } catch (e) {}

    ['click', 'keydown', 'scroll'].forEach(function (kind) {
        window.addEventListener(kind, function () {
            window.__pagepilotLastInteraction = Date.now();
        }, true);
    });
    return true;
})()
"#;

fn activity_query(quiet_ms: u64) -> String {
    format!(
        r#"(function __pagepilotActivityQuery() {{
    var last = Math.max(
        window.__pagepilotLastMutation || 0,
        window.__pagepilotLastRequest || 0,
        window.__pagepilotLastInteraction || 0
    );
    if (last === 0) return true;
    return (Date.now() - last) > {quiet_ms};
}})()"#
    )
}

/// Polls the activity probe until the page quiesces.
pub struct StabilityProbe {
    driver: Arc<dyn PageDriver>,
    config: NavConfig,
}

impl StabilityProbe {
    pub fn new(driver: Arc<dyn PageDriver>, config: NavConfig) -> Self {
        Self { driver, config }
    }

    /// Install the activity listeners on the current page.
    pub async fn install(&self) {
        if self.driver.run_script(ACTIVITY_PROBE_JS).await.is_none() {
            debug!("activity probe installation yielded nothing");
        }
    }

    /// Wait until the page has been quiet for the configured window.
    /// Returns false when `timeout` elapses first; an unresponsive page
    /// counts as not stable.
    pub async fn wait_for_stable(&self, timeout: std::time::Duration) -> bool {
        self.install().await;
        let query = activity_query(self.config.quiet_window_ms);
        let stable = poll_until(self.config.poll_interval(), timeout, || {
            let query = query.clone();
            async move {
                matches!(
                    self.driver.run_script(&query).await,
                    Some(Value::Bool(true))
                )
            }
        })
        .await;
        debug!(stable, "stability wait finished");
        stable
    }

    /// Convenience wrapper using the configured default timeout.
    pub async fn wait_default(&self) -> bool {
        self.wait_for_stable(self.config.stability_timeout()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use page_driver::testing::ScriptedDriver;
    use std::time::Duration;

    /// Driver whose page reports its last activity `age_ms` before each
    /// query, the way a busy page keeps refreshing its timestamps.
    fn driver_with_activity_age(age_ms: i64) -> Arc<ScriptedDriver> {
        Arc::new(ScriptedDriver::new().with_script_handler(move |code| {
            if code.contains(ACTIVITY_QUERY_MARKER) {
                let last = Utc::now().timestamp_millis() - age_ms;
                let quiet = Utc::now().timestamp_millis() - last > 500;
                Some(Value::Bool(quiet))
            } else {
                Some(Value::Bool(true))
            }
        }))
    }

    #[tokio::test]
    async fn test_stale_activity_is_stable_immediately() {
        let probe = StabilityProbe::new(driver_with_activity_age(600), NavConfig::fast());
        assert!(probe.wait_for_stable(Duration::from_millis(300)).await);
    }

    #[tokio::test]
    async fn test_fresh_activity_times_out_false() {
        let probe = StabilityProbe::new(driver_with_activity_age(200), NavConfig::fast());
        assert!(!probe.wait_for_stable(Duration::from_millis(300)).await);
    }

    #[tokio::test]
    async fn test_unresponsive_page_is_not_stable() {
        let driver = Arc::new(ScriptedDriver::new().with_script_handler(|_| None));
        let probe = StabilityProbe::new(driver, NavConfig::fast());
        assert!(!probe.wait_for_stable(Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn test_probe_installs_before_polling() {
        let driver = driver_with_activity_age(600);
        let probe = StabilityProbe::new(driver.clone(), NavConfig::fast());
        probe.wait_for_stable(Duration::from_millis(200)).await;
        assert_eq!(driver.scripts_containing("__pagepilotProbe"), 1);
        assert!(driver.scripts_containing(ACTIVITY_QUERY_MARKER) >= 1);
    }
}
