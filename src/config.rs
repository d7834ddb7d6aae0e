//! Application configuration.
//!
//! Nested serde structs with explicit defaults, loaded from a YAML file and
//! overridable through `PAGEPILOT_*` environment variables.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use agent_loop::AgentConfig;
use anyhow::{Context, Result};
use element_resolver::ResolverConfig;
use nav_control::NavConfig;
use serde::{Deserialize, Serialize};

/// File name looked up under `./config/` and the platform config directory.
pub const CONFIG_FILE_NAME: &str = "pagepilot.yaml";

/// Top-level configuration nesting the per-component sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub agent: AgentConfig,
    pub navigation: NavConfig,
    pub resolver: ResolverConfig,
    pub recording: RecordingSettings,
}

/// Connection settings for the local model server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    /// Model used for screenshot analysis; `None` disables the visual path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_model: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            vision_model: None,
            timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session recording settings; disabled unless turned on here or via `--record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    pub enabled: bool,
    pub output_dir: PathBuf,
    pub frame_interval_ms: u64,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: PathBuf::from("recordings"),
            frame_interval_ms: 500,
        }
    }
}

impl RecordingSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl AppConfig {
    /// Parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Serialize to YAML and write, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create config directory {}", parent.display())
                })?;
            }
        }
        let raw = self.to_yaml()?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config")
    }

    /// Apply `PAGEPILOT_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("PAGEPILOT_OLLAMA_URL") {
            if !url.trim().is_empty() {
                self.llm.base_url = url;
            }
        }
        if let Ok(model) = env::var("PAGEPILOT_MODEL") {
            if !model.trim().is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(model) = env::var("PAGEPILOT_VISION_MODEL") {
            if !model.trim().is_empty() {
                self.llm.vision_model = Some(model);
            }
        }
        if let Ok(secs) = env::var("PAGEPILOT_LLM_TIMEOUT_SECS") {
            if let Ok(secs) = secs.trim().parse() {
                self.llm.timeout_secs = secs;
            }
        }
        if let Ok(steps) = env::var("PAGEPILOT_MAX_STEPS") {
            if let Ok(steps) = steps.trim().parse() {
                self.agent.max_steps = steps;
            }
        }
        if let Ok(dir) = env::var("PAGEPILOT_RECORD_DIR") {
            if !dir.trim().is_empty() {
                self.recording.enabled = true;
                self.recording.output_dir = PathBuf::from(dir);
            }
        }
    }
}

/// Default config file location: a local `./config/pagepilot.yaml` wins over
/// the platform config directory.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from("config").join(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("pagepilot").join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}
