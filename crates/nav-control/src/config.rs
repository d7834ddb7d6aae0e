//! Navigation timing knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Longest wait for the engine's load-finished signal.
    /// Default: 30000 (30 seconds)
    pub load_timeout_ms: u64,

    /// Post-verification settle delay before a navigation counts as done;
    /// covers post-load script execution.
    /// Default: 3000
    pub settle_delay_ms: u64,

    /// Fixed delay between navigation attempts.
    /// Default: 2000
    pub attempt_delay_ms: u64,

    /// Attempts of the whole normalize→load→verify sequence.
    /// Default: 3
    pub max_attempts: u32,

    /// Quiet window: the page is stable once the newest activity
    /// timestamp is older than this.
    /// Default: 500
    pub quiet_window_ms: u64,

    /// Stability poll cadence.
    /// Default: 100
    pub poll_interval_ms: u64,

    /// Default overall stability wait.
    /// Default: 5000
    pub stability_timeout_ms: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 30_000,
            settle_delay_ms: 3_000,
            attempt_delay_ms: 2_000,
            max_attempts: 3,
            quiet_window_ms: 500,
            poll_interval_ms: 100,
            stability_timeout_ms: 5_000,
        }
    }
}

impl NavConfig {
    /// Near-zero delays for offline runs and tests.
    pub fn fast() -> Self {
        Self {
            load_timeout_ms: 250,
            settle_delay_ms: 0,
            attempt_delay_ms: 0,
            quiet_window_ms: 500,
            poll_interval_ms: 20,
            stability_timeout_ms: 300,
            ..Self::default()
        }
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn attempt_delay(&self) -> Duration {
        Duration::from_millis(self.attempt_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stability_timeout(&self) -> Duration {
        Duration::from_millis(self.stability_timeout_ms)
    }
}
