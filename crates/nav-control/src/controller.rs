//! The navigation retry machine.

use std::sync::Arc;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use page_driver::PageDriver;

use crate::config::NavConfig;
use crate::errors::NavError;
use crate::normalize::normalize_url;
use crate::verify::verify_landed;

/// Phases of one navigation, in order. Terminal phases are `Settled` and
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavPhase {
    Idle,
    Normalizing,
    Loading,
    Verifying,
    Settled,
    Failed,
}

/// Drives one URL navigation through normalize → load → verify, retrying
/// the whole sequence on retryable failures.
pub struct Navigator {
    driver: Arc<dyn PageDriver>,
    config: NavConfig,
}

impl Navigator {
    pub fn new(driver: Arc<dyn PageDriver>, config: NavConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Navigate to `raw_url`, returning the URL actually landed on.
    pub async fn navigate(&self, raw_url: &str) -> Result<String, NavError> {
        let mut last_err = NavError::EmptyUrl;
        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                sleep(self.config.attempt_delay()).await;
            }
            match self.attempt(raw_url).await {
                Ok(final_url) => {
                    sleep(self.config.settle_delay()).await;
                    debug!(phase = ?NavPhase::Settled, url = %final_url, attempt, "navigation settled");
                    return Ok(final_url);
                }
                Err(err) => {
                    warn!(attempt, error = %err, "navigation attempt failed");
                    let retryable = err.is_retryable();
                    last_err = err;
                    if !retryable {
                        break;
                    }
                }
            }
        }
        debug!(phase = ?NavPhase::Failed, error = %last_err, "navigation failed");
        Err(last_err)
    }

    async fn attempt(&self, raw_url: &str) -> Result<String, NavError> {
        debug!(phase = ?NavPhase::Normalizing, input = raw_url);
        let url = normalize_url(raw_url)?;

        debug!(phase = ?NavPhase::Loading, %url);
        self.driver.navigate(&url).await;
        match self.driver.wait_load_finished(self.config.load_timeout()).await {
            Some(true) => {}
            Some(false) => return Err(NavError::LoadFailed),
            None => return Err(NavError::LoadTimeout),
        }

        debug!(phase = ?NavPhase::Verifying, %url);
        let actual = self.driver.current_url().await;
        verify_landed(&url, &actual)?;
        Ok(actual)
    }
}
