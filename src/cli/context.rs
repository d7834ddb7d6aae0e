use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppConfig;

/// Shared command context: the effective configuration and where it came
/// from.
pub struct CliContext {
    config: Arc<AppConfig>,
    config_path: PathBuf,
}

impl CliContext {
    pub fn new(config: AppConfig, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
